use std::fmt;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Grades {
    messages: Vec<String>,
    points: u32,
}

impl Grades {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_message(&mut self, msg: impl Into<String>) {
        self.messages.push(msg.into());
    }

    pub fn add_points(&mut self, points: u32) {
        self.points += points;
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn pass(&mut self, path: &str) {
        self.add_message(format!("PASS: {path}"));
    }

    pub fn fail(&mut self, path: &str) {
        self.add_message(format!("FAIL: {path}"));
    }
}

impl fmt::Display for Grades {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for msg in &self.messages {
            writeln!(f, "{msg}")?;
        }
        Ok(())
    }
}
