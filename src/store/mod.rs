pub mod json_store;
pub mod schema;

use std::cell::RefCell;
use std::rc::Rc;

use crate::engine::score::AttemptRecord;

/// Receiver of judged attempts for long-term statistics.
pub trait StatsSink {
    fn record_attempt(&mut self, record: &AttemptRecord);
}

/// Discards every attempt.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl StatsSink for NullSink {
    fn record_attempt(&mut self, _record: &AttemptRecord) {}
}

impl<S: StatsSink + ?Sized> StatsSink for Rc<RefCell<S>> {
    fn record_attempt(&mut self, record: &AttemptRecord) {
        self.borrow_mut().record_attempt(record);
    }
}
