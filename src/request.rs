//! Client-side lifecycle of network requests.
//!
//! The view reads request progress only through [`RequestState`]; nothing
//! outside this module inspects how the state is stored.

#[derive(Debug, Clone, PartialEq)]
pub enum RequestState<T> {
    Idle,
    Loading,
    Success(T),
    Failed(String),
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        RequestState::Idle
    }
}

impl<T> RequestState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }
}

/// Tag for one fetch of a query. Responses carrying an older generation than
/// the latest issued fetch are dropped.
pub type Generation = u64;

/// Read-side tracker: keeps the last good data across refetches and the
/// last error until a fetch succeeds.
#[derive(Debug, Clone)]
pub struct Query<T> {
    data: Option<T>,
    error: Option<String>,
    in_flight: Option<Generation>,
    generation: Generation,
}

impl<T> Default for Query<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            in_flight: None,
            generation: 0,
        }
    }
}

impl<T> Query<T> {
    /// Starts a new fetch and returns its generation.
    pub fn begin(&mut self) -> Generation {
        self.generation += 1;
        self.in_flight = Some(self.generation);
        self.generation
    }

    /// Applies a fetch result. Returns `false` when the result belongs to a
    /// superseded fetch and was ignored.
    pub fn resolve(&mut self, generation: Generation, result: Result<T, String>) -> bool {
        if generation != self.generation {
            log::debug!(
                "dropping stale response (generation {} < {})",
                generation,
                self.generation
            );
            return false;
        }
        self.in_flight = None;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
            }
            Err(message) => {
                self.error = Some(message);
            }
        }
        true
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// First load only: fetching with neither data nor an error to show.
    pub fn is_loading(&self) -> bool {
        self.is_fetching() && self.data.is_none() && self.error.is_none()
    }

    pub fn state(&self) -> RequestState<&T> {
        if let Some(message) = &self.error {
            return RequestState::Failed(message.clone());
        }
        match (&self.data, self.is_fetching()) {
            (Some(data), _) => RequestState::Success(data),
            (None, true) => RequestState::Loading,
            (None, false) => RequestState::Idle,
        }
    }
}

/// Write-side tracker for a single mutation.
#[derive(Debug, Clone)]
pub struct Mutation<T> {
    state: RequestState<T>,
}

impl<T> Default for Mutation<T> {
    fn default() -> Self {
        Self {
            state: RequestState::Idle,
        }
    }
}

impl<T> Mutation<T> {
    /// Marks the mutation in flight. Returns `false` if one already is.
    pub fn begin(&mut self) -> bool {
        if self.state.is_loading() {
            return false;
        }
        self.state = RequestState::Loading;
        true
    }

    pub fn resolve(&mut self, result: Result<T, String>) {
        self.state = match result {
            Ok(value) => RequestState::Success(value),
            Err(message) => RequestState::Failed(message),
        };
    }

    pub fn state(&self) -> &RequestState<T> {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_loading()
    }
}
