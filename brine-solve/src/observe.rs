/// Hook for watching, and optionally steering, a running solver.
///
/// A solver hands every iteration event to its observer. Returning
/// `Some(action)` asks the solver to take a solver-specific action (such as
/// stopping early); returning `None` leaves the iteration untouched.
///
/// Recycle loops use this to log per-iteration tolerances without the solver
/// knowing anything about logging.
///
/// Any `FnMut(&E) -> Option<A>` closure is an observer, and `()` is the
/// observer that never intervenes.
pub trait Observer<E, A> {
    /// Inspects one event and optionally requests an action.
    fn observe(&mut self, event: &E) -> Option<A>;
}

impl<E, A, F> Observer<E, A> for F
where
    F: FnMut(&E) -> Option<A>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self(event)
    }
}

impl<E, A> Observer<E, A> for () {
    fn observe(&mut self, _event: &E) -> Option<A> {
        None
    }
}
