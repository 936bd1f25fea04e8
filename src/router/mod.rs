//! Message routing between the transport and the enrichment pipeline

mod dispatch;
mod message;
mod outbound;

pub use dispatch::{Ack, MessageRouter};
pub use message::{
    message_type, Envelope, InboundMessage, MessageSender, RouterError, DOM_SCAN_RESULT,
    SCAN_SITE_REQUEST,
};
pub use outbound::{
    ChannelSink, ChannelTrigger, NotificationSink, ScanTarget, ScanTrigger, TransportError,
    TriggerCommand,
};
