use std::collections::VecDeque;

#[derive(Debug, Default)]
pub struct LogFeed {
    entries: VecDeque<String>,
    capacity: Option<usize>,
}

impl LogFeed {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    pub fn prepend(&mut self, message: impl Into<String>) {
        self.entries.push_front(message.into());
        if let Some(capacity) = self.capacity {
            self.entries.truncate(capacity);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn latest(&self) -> Option<&str> {
        self.entries.front().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
