use super::SubscriberEmail;

#[derive(Debug)]
pub struct NewSubscriber {
    pub email: SubscriberEmail,
    pub name: Option<String>,
}

impl NewSubscriber {
    /// Blank names are treated as absent; names are otherwise kept verbatim.
    pub fn parse(name: Option<String>, email: String) -> Result<Self, String> {
        let email = SubscriberEmail::parse(email)?;
        let name = name.filter(|name| !name.trim().is_empty());

        Ok(Self { email, name })
    }
}
