mod client;
mod constants;
mod dns;
mod error;
mod request;
mod validate;

pub mod settings;
pub mod xml;

use log::{debug, info};

use client::Credentials;
use dns::DnsExpander;
use error::Result;
pub use error::{Error, ErrorKind};
pub use settings::{AutodiscoverResult, Settings};
use validate::validate_email;

const INVALID_EMAIL_MESSAGE: &str = "Invalid email address";

fn parse_domain<E: AsRef<str>>(email: E) -> Result<String> {
    if !validate_email(email.as_ref()) {
        return Err(Error::new(ErrorKind::InvalidEmailAddress, INVALID_EMAIL_MESSAGE));
    }

    match email.as_ref().rsplit('@').next() {
        Some(domain) if !domain.is_empty() => Ok(domain.to_string()),
        _ => Err(Error::new(ErrorKind::InvalidEmailAddress, INVALID_EMAIL_MESSAGE)),
    }
}

/// A single autodiscover call in the making.
///
/// ```no_run
/// # use ms_autodiscover::Discovery;
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let result = Discovery::new("foo@bar.onmicrosoft.com", "hunter2")
///     .settings(["ExternalEwsVersion"])
///     .run()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct Discovery {
    email: String,
    password: String,
    username: Option<String>,
    query_dns: bool,
    settings: Vec<String>,
}

impl Discovery {
    pub fn new<E: Into<String>, P: Into<String>>(email: E, password: P) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            username: None,
            query_dns: true,
            settings: Vec::new(),
        }
    }

    /// Overrides the login name, which defaults to the email address.
    pub fn username<U: Into<String>>(mut self, username: U) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Enables or disables SRV expansion of the candidate domains.
    /// Expansion is on by default, passing `false` disables it.
    pub fn query_dns(mut self, query_dns: bool) -> Self {
        self.query_dns = query_dns;
        self
    }

    /// Requests additional settings by name. When any are requested the
    /// call resolves with the full settings map instead of the bare
    /// endpoint url.
    pub fn settings<S: Into<String>, I: IntoIterator<Item = S>>(mut self, settings: I) -> Self {
        self.settings.extend(settings.into_iter().map(Into::into));
        self
    }

    /// Runs the discovery: expands the candidate domains, races every
    /// endpoint pattern and extracts the requested settings from the first
    /// successful response.
    pub async fn run(self) -> Result<AutodiscoverResult> {
        if self.password.is_empty() {
            return Err(Error::new(
                ErrorKind::MissingCredentials,
                "A password is required to query user settings",
            ));
        }

        let domain = parse_domain(&self.email)?;

        let candidates = self.candidate_domains(&domain).await;

        self.run_attempts(client::attempts(&candidates)).await
    }

    /// Spawns the discovery and hands the outcome to a callback instead of
    /// awaiting it. A thin adapter over [`Discovery::run`]; the callback
    /// receives exactly one `Ok` or `Err`.
    pub fn run_with_callback<F>(self, callback: F) -> tokio::task::JoinHandle<()>
    where
        F: FnOnce(Result<AutodiscoverResult>) + Send + 'static,
    {
        tokio::spawn(async move { callback(self.run().await) })
    }

    /// The smtp domain itself, followed by its SRV targets when dns
    /// expansion is enabled.
    async fn candidate_domains(&self, domain: &str) -> Vec<String> {
        let mut candidates = vec![domain.to_string()];

        if self.query_dns {
            let expanded = DnsExpander::new().expand(domain).await;

            debug!("Srv expansion added {} candidate domain(s)", expanded.len());

            candidates.extend(expanded);
        }

        candidates
    }

    /// Races a prepared set of attempts and shapes the winning response.
    async fn run_attempts(self, attempts: Vec<client::Attempt>) -> Result<AutodiscoverResult> {
        let body = request::user_settings_request(&self.email, &self.settings);

        let credentials = Credentials {
            username: self.username.as_deref().unwrap_or(&self.email),
            password: &self.password,
        };

        let raw = client::race(&attempts, &body, &credentials).await?;

        info!("An autodiscover endpoint answered for {}", self.email);

        let tree = xml::parse(raw)?;
        let settings = settings::extract_settings(&tree)?;

        if self.settings.is_empty() {
            match settings.get(constants::EWS_URL_SETTING) {
                Some(url) => Ok(AutodiscoverResult::Url(url.clone())),
                None => Err(Error::new(
                    ErrorKind::MalformedResponse,
                    "Response did not contain the external ews url",
                )),
            }
        } else {
            Ok(AutodiscoverResult::Settings(settings))
        }
    }
}

/// Discovers the external ews endpoint url for an email address with the
/// default options.
pub async fn from_email<E: AsRef<str>, P: AsRef<str>>(
    email: E,
    password: P,
) -> Result<AutodiscoverResult> {
    Discovery::new(email.as_ref(), password.as_ref()).run().await
}
