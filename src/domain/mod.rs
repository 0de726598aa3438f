mod new_subscriber;
mod subscriber_email;
mod subscription;
mod subscription_id;

pub use new_subscriber::NewSubscriber;
pub use subscriber_email::SubscriberEmail;
pub use subscription::Subscription;
pub use subscription_id::SubscriptionId;
