/// Options for creating a [`Runtime`](crate::Runtime).
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    nr_localities: usize,
    nr_threads_per_locality: Option<usize>,
    thread_name_prefix: String,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            nr_localities: 1,
            nr_threads_per_locality: None,
            thread_name_prefix: "parrs".to_string(),
        }
    }
}

impl RuntimeOptions {
    /// Return the number of localities.
    #[must_use]
    pub fn nr_localities(&self) -> usize {
        self.nr_localities
    }

    /// Set the number of localities.
    pub fn set_nr_localities(&mut self, nr_localities: usize) -> &mut Self {
        self.nr_localities = nr_localities;
        self
    }

    /// Set the number of localities.
    #[must_use]
    pub fn with_nr_localities(mut self, nr_localities: usize) -> Self {
        self.set_nr_localities(nr_localities);
        self
    }

    /// Return the number of worker threads per locality.
    ///
    /// Defaults to the available parallelism divided over the localities, and at least one.
    #[must_use]
    pub fn nr_threads_per_locality(&self) -> usize {
        self.nr_threads_per_locality.unwrap_or_else(|| {
            let available = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
            (available / self.nr_localities.max(1)).max(1)
        })
    }

    /// Set the number of worker threads per locality.
    pub fn set_nr_threads_per_locality(&mut self, nr_threads: usize) -> &mut Self {
        self.nr_threads_per_locality = Some(nr_threads);
        self
    }

    /// Set the number of worker threads per locality.
    #[must_use]
    pub fn with_nr_threads_per_locality(mut self, nr_threads: usize) -> Self {
        self.set_nr_threads_per_locality(nr_threads);
        self
    }

    /// Return the prefix of worker thread names.
    ///
    /// Threads are named `{prefix}-{locality}-{thread}`.
    #[must_use]
    pub fn thread_name_prefix(&self) -> &str {
        &self.thread_name_prefix
    }

    /// Set the prefix of worker thread names.
    pub fn set_thread_name_prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Set the prefix of worker thread names.
    #[must_use]
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.set_thread_name_prefix(prefix);
        self
    }
}
