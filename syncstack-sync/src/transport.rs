//! Transport layer abstraction.
//!
//! A [`Transport`] carries one [`Request`] to the remote endpoint and hands
//! back the finished [`Exchange`]. Awaiting the returned future is what
//! starts the request; its output is the response tuple (request, response
//! head, raw body, error). Transports never fail with `Err`: every failure is
//! described inside the exchange.

use async_trait::async_trait;
use syncstack_types::{Exchange, Request};

/// Something that can perform one request/response round trip.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and waits for it to finish.
    async fn send(&self, request: Request) -> Exchange;
}

/// A scripted transport for testing.
pub mod mock {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::time::Duration;
    use syncstack_types::{ExchangeError, Response, Value};

    /// One scripted reply.
    #[derive(Debug, Clone)]
    pub enum MockReply {
        /// A response with the given status and body. Non-2xx statuses are
        /// reported as [`ExchangeError::Status`].
        Respond { status: u16, body: String },
        /// The request never reaches the endpoint.
        Network(String),
    }

    /// Replies to requests from a FIFO script and records every request.
    ///
    /// A request arriving with the script exhausted fails with a network
    /// error.
    #[derive(Debug, Default)]
    pub struct MockTransport {
        replies: Mutex<VecDeque<MockReply>>,
        requests: Mutex<Vec<Request>>,
        delay: Mutex<Option<Duration>>,
    }

    impl MockTransport {
        /// Creates a transport with an empty script.
        pub fn new() -> Self {
            Self::default()
        }

        /// Queues a reply.
        pub fn push_reply(&self, reply: MockReply) {
            self.replies.lock().push_back(reply);
        }

        /// Queues a response with a JSON body.
        pub fn respond_json(&self, status: u16, body: Value) {
            self.respond(status, body.to_string());
        }

        /// Queues a response with a raw body.
        pub fn respond(&self, status: u16, body: impl Into<String>) {
            self.push_reply(MockReply::Respond {
                status,
                body: body.into(),
            });
        }

        /// Queues a network failure.
        pub fn fail_network(&self, reason: impl Into<String>) {
            self.push_reply(MockReply::Network(reason.into()));
        }

        /// Makes every reply wait `delay` before it is delivered.
        pub fn set_delay(&self, delay: Duration) {
            *self.delay.lock() = Some(delay);
        }

        /// Every request received so far, in order.
        pub fn requests(&self) -> Vec<Request> {
            self.requests.lock().clone()
        }

        /// The most recent request.
        pub fn last_request(&self) -> Option<Request> {
            self.requests.lock().last().cloned()
        }

        /// Number of requests received.
        pub fn request_count(&self) -> usize {
            self.requests.lock().len()
        }

        /// Number of replies still scripted.
        pub fn pending_replies(&self) -> usize {
            self.replies.lock().len()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&self, request: Request) -> Exchange {
            self.requests.lock().push(request.clone());
            let reply = self.replies.lock().pop_front();
            let delay = *self.delay.lock();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            match reply {
                Some(MockReply::Respond { status, body }) => {
                    let response = Response::status(status);
                    if response.is_success() {
                        Exchange::success(request, response, Some(body))
                    } else {
                        let mut exchange = Exchange::failure(
                            request,
                            Some(response),
                            ExchangeError::Status {
                                status,
                                body: Some(body.clone()),
                            },
                        );
                        exchange.body = Some(body);
                        exchange
                    }
                }
                Some(MockReply::Network(reason)) => {
                    Exchange::failure(request, None, ExchangeError::Network(reason))
                }
                None => Exchange::failure(
                    request,
                    None,
                    ExchangeError::Network("no scripted reply".into()),
                ),
            }
        }
    }
}
