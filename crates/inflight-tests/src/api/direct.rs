//! In-process API implementation directly using the `inflight-engine` crate

use std::sync::Arc;

use eyre::Result;
use inflight_core::{parse_envelope, Config, RawRequest, Request, RequestHandler, Response};
use inflight_engine::{Dispatcher, Seed};
use tokio::sync::oneshot;
use tokio::task::{self, JoinHandle};

use super::{Api, RequestMsg};

pub struct DirectBackend {
    dispatcher: Arc<Dispatcher>,
    join_handles: Vec<JoinHandle<()>>,
}

struct DirectRawRequest {
    response_channel: oneshot::Sender<Response>,
}

pub async fn start(workers: u16, config: Config, seed: Seed) -> Result<(DirectBackend, Api)> {
    let dispatcher = Arc::new(
        task::spawn_blocking(move || inflight_engine::launch_with_seed(&config, &seed)).await??,
    );

    let it = (0..workers).map(|_| {
        let (sender, receiver) = flume::bounded::<RequestMsg>(65536);
        let dispatcher = dispatcher.clone();
        let handle = task::spawn_blocking(move || {
            let dispatcher = &*dispatcher;
            for msg in receiver.into_iter() {
                match parse_envelope(&msg.line) {
                    Ok((kind, data)) => {
                        let raw = Box::new(DirectRawRequest {
                            response_channel: msg.response_channel,
                        });
                        dispatcher.handle(Request::from_raw(kind, data, raw));
                    }
                    Err(err) => {
                        let _ = msg.response_channel.send(err.response());
                    }
                }
            }
        });
        (sender, handle)
    });
    let (senders, join_handles) = it.unzip();

    let backend = DirectBackend {
        dispatcher,
        join_handles,
    };
    Ok((backend, Api::direct(senders)))
}

impl DirectBackend {
    /// Waits for every worker, so all `Api` clones must be gone
    pub async fn shutdown(self) -> Result<()> {
        for handle in self.join_handles {
            handle.await?;
        }
        task::spawn_blocking(move || {
            if let Some(dispatcher) = Arc::into_inner(self.dispatcher) {
                dispatcher.shutdown();
            }
        })
        .await?;
        Ok(())
    }
}

impl RawRequest for DirectRawRequest {
    fn respond(self: Box<Self>, response: Response) {
        // the test may have given up on the request
        let _ = self.response_channel.send(response);
    }
}
