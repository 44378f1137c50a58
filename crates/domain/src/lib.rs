pub mod subscription;
pub mod webhook_log;

pub use subscription::{
    CreateSubscriptionRequest, Subscription, SubscriptionResponse, UpdateSubscriptionRequest,
};
pub use webhook_log::{
    DeliveryStatus, DeliveryStatusResponse, DeliveryTask, NewWebhookLog,
    SubscriptionDeliveriesResponse, WebhookLog,
};
