pub mod orchestrator;
pub mod topics;
pub mod types;

pub use orchestrator::Orchestrator;
pub use topics::{HistoryTopic, PlaystyleTopic, Topic};
pub use types::{AxisReport, ChatReply, FaultlinesReport, InsightError, TopicInsight};
