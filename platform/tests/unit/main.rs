//! Unit test harness

mod test_admission;
mod test_orchestrator;
mod test_rooms;
