pub mod outline;
pub mod task_ops;
pub mod timer_ops;
