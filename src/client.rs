use futures::stream::{FuturesUnordered, StreamExt};

use log::debug;

use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode};

use crate::constants::SVC_PATH;
use crate::error::{ErrorKind, Result};
use crate::failed;

/// Basic auth credentials sent with every settings request.
pub(crate) struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// The transport pattern of a single attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Pattern {
    /// Post the request body straight to the service url.
    DirectPost,
    /// Probe with a get that must answer `302 Found`, then post to the
    /// address in its `Location` header.
    RedirectThenPost,
}

/// One candidate transaction against one constructed service url.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Attempt {
    url: String,
    pattern: Pattern,
}

/// The http clients shared by every attempt of one race.
struct Transport<'a> {
    /// Redirect following client used for every settings post.
    post: Client,
    /// Non following client used for redirect probes.
    probe: Client,
    body: &'a str,
    credentials: &'a Credentials<'a>,
}

impl Transport<'_> {
    async fn post_settings(&self, url: &str) -> Result<String> {
        let response = self
            .post
            .post(url)
            .basic_auth(self.credentials.username, Some(self.credentials.password))
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(self.body.to_string())
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }
}

impl Attempt {
    pub(crate) fn new<U: Into<String>>(url: U, pattern: Pattern) -> Self {
        Self {
            url: url.into(),
            pattern,
        }
    }

    async fn run(&self, transport: &Transport<'_>) -> Result<String> {
        match self.pattern {
            Pattern::DirectPost => transport.post_settings(&self.url).await,
            Pattern::RedirectThenPost => {
                let response = transport.probe.get(&self.url).send().await?;
                let status = response.status();

                if status != StatusCode::FOUND {
                    failed!(
                        ErrorKind::UnexpectedStatus(status.as_u16()),
                        "Redirect probe for {} answered {} instead of 302",
                        self.url,
                        status
                    );
                }

                let location = match response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok())
                {
                    Some(location) => location.to_string(),
                    None => failed!(
                        ErrorKind::UnexpectedBehavior,
                        "Redirect probe for {} did not include a location header",
                        self.url
                    ),
                };

                transport.post_settings(&location).await
            }
        }
    }
}

/// Constructs the three attempts for every candidate domain: a direct post
/// to the domain itself, a direct post to its `autodiscover.` host and a
/// plain http redirect probe of that host.
pub(crate) fn attempts<D: AsRef<str>>(domains: &[D]) -> Vec<Attempt> {
    let mut attempts = Vec::with_capacity(domains.len() * 3);

    for domain in domains {
        let domain = domain.as_ref();

        attempts.push(Attempt::new(
            format!("https://{domain}{SVC_PATH}"),
            Pattern::DirectPost,
        ));
        attempts.push(Attempt::new(
            format!("https://autodiscover.{domain}{SVC_PATH}"),
            Pattern::DirectPost,
        ));
        attempts.push(Attempt::new(
            format!("http://autodiscover.{domain}{SVC_PATH}"),
            Pattern::RedirectThenPost,
        ));
    }

    attempts
}

/// Fires every attempt at once and resolves with the body of the first one
/// that completes successfully. The remaining futures are dropped, which
/// aborts their in flight requests; losers that already reached the server
/// are simply discarded.
pub(crate) async fn race(
    attempts: &[Attempt],
    body: &str,
    credentials: &Credentials<'_>,
) -> Result<String> {
    let transport = Transport {
        post: Client::builder().build()?,
        probe: Client::builder().redirect(Policy::none()).build()?,
        body,
        credentials,
    };

    let mut in_flight: FuturesUnordered<_> = attempts
        .iter()
        .map(|attempt| attempt.run(&transport))
        .collect();

    let mut failures = Vec::new();

    while let Some(outcome) = in_flight.next().await {
        match outcome {
            Ok(raw) => {
                debug!(
                    "An autodiscover endpoint answered, discarding {} other attempt(s)",
                    in_flight.len()
                );

                return Ok(raw);
            }
            Err(error) => {
                debug!("Autodiscover attempt failed: {}", error);

                failures.push(error);
            }
        }
    }

    failed!(
        ErrorKind::AllEndpointsFailed(failures),
        "Could not reach an autodiscover endpoint on any of the {} attempts",
        attempts.len()
    )
}
