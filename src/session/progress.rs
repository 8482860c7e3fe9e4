/// Forwards reveal progress (0 to 100) to a caller callback.
///
/// Reported values are clamped and never decrease; repeated values are not re-sent.
pub struct ProgressReporter<'a> {
    callback: Box<dyn FnMut(f64) + 'a>,
    last: Option<f64>,
}

impl std::fmt::Debug for ProgressReporter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}

impl<'a> ProgressReporter<'a> {
    pub fn new(callback: impl FnMut(f64) + 'a) -> Self {
        Self {
            callback: Box::new(callback),
            last: None,
        }
    }

    /// Reporter that discards every update.
    pub fn silent() -> Self {
        Self::new(|_| {})
    }

    pub fn report(&mut self, percent: f64) {
        if percent.is_nan() {
            return;
        }
        let p = percent.clamp(0.0, 100.0);
        if let Some(last) = self.last
            && p <= last
        {
            return;
        }
        self.last = Some(p);
        (self.callback)(p);
    }

    /// Report 100 unless it was already reported.
    pub fn finish(&mut self) {
        self.report(100.0);
    }

    pub fn last(&self) -> Option<f64> {
        self.last
    }
}

impl Default for ProgressReporter<'_> {
    fn default() -> Self {
        Self::silent()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/progress.rs"]
mod tests;
