pub mod compile;
pub mod dispatch;
pub mod generate;
pub mod lesson;
pub mod preview;
pub mod retry;
pub mod serve;
pub mod shared;
