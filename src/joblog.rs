// Job log: the per-invocation log that the flow host shows to the user

pub trait JobLog: Send + Sync {
    fn line(&self, line: &str);
}

/// Forwards job lines to tracing under the `job` target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingJobLog;

impl JobLog for TracingJobLog {
    fn line(&self, line: &str) {
        tracing::info!(target: "job", "{}", line);
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryJobLog {
    lines: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MemoryJobLog {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.lines()
            .iter()
            .filter(|line| line.contains(needle))
            .count()
    }
}

#[cfg(test)]
impl JobLog for MemoryJobLog {
    fn line(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}
