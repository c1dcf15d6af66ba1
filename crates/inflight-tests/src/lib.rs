use eyre::Result;
use inflight_core::{CancellationRefund, Config};
use inflight_engine::Seed;
use settings::TestSettings;

mod api;
mod settings;
pub use api::tcp::Connection;
pub use api::{field, Api, Session};
pub use settings::Transport;

pub struct TestCtxBuilder {
    /// Records loaded before the first request
    pub seed: Seed,
    /// Refund rule for cancelled tier 3 bookings
    pub refund_policy: CancellationRefund,
    /// How requests reach the system
    pub transport: Transport,
    /// Worker threads of the direct transport
    pub direct_workers: u16,
}

impl TestCtxBuilder {
    /// Create a new test context builder initialized with environment defaults
    pub fn from_env() -> Result<Self> {
        let settings = TestSettings::load()?;
        Ok(TestCtxBuilder {
            seed: Seed::default(),
            refund_policy: CancellationRefund::default(),
            transport: settings.transport,
            direct_workers: settings.direct_workers,
        })
    }

    /// Set the records to start with
    pub fn with_seed(mut self, seed: Seed) -> Self {
        self.seed = seed;
        self
    }

    /// Set the refund rule for cancelled tier 3 bookings
    pub fn with_refund_policy(mut self, policy: CancellationRefund) -> Self {
        self.refund_policy = policy;
        self
    }

    /// Force a transport regardless of the settings
    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = transport;
        self
    }

    /// Set the number of worker threads of the direct transport
    pub fn with_direct_workers(mut self, workers: u16) -> Self {
        assert_ne!(workers, 0);
        self.direct_workers = workers;
        self
    }

    fn config(&self) -> Config {
        Config {
            cancellation_refund: self.refund_policy,
            ..Config::default()
        }
    }

    /// Build the test context
    pub async fn build(self) -> Result<TestCtx> {
        let config = self.config();
        let (backend, api) = match self.transport {
            Transport::Direct => {
                let (backend, api) =
                    api::direct::start(self.direct_workers, config, self.seed).await?;
                (Backend::Direct(backend), api)
            }
            Transport::Tcp => {
                let (backend, api) = api::tcp::start(config, self.seed).await?;
                (Backend::Tcp(backend), api)
            }
        };

        Ok(TestCtx {
            api,
            backend,
            transport: self.transport,
            refund_policy: self.refund_policy,
            drop_bomb: DropBomb,
        })
    }
}

enum Backend {
    Direct(api::direct::DirectBackend),
    Tcp(api::tcp::TcpBackend),
}

/// Test context
pub struct TestCtx {
    /// API allowing to interact with the reservation system
    pub api: Api,
    backend: Backend,
    /// Transport the requests travel over
    pub transport: Transport,
    /// Refund rule for cancelled tier 3 bookings
    pub refund_policy: CancellationRefund,

    drop_bomb: DropBomb,
}

impl TestCtx {
    /// Number of open TCP connections (always 0 for the direct transport)
    pub fn open_connections(&self) -> usize {
        match &self.backend {
            Backend::Direct(_) => 0,
            Backend::Tcp(backend) => backend.open_connections(),
        }
    }

    /// Shut the reservation system down and finish the test
    ///
    /// Every clone of [`TestCtx::api`] must have been dropped.
    pub async fn finish(self) -> Result<()> {
        std::mem::forget(self.drop_bomb);
        drop(self.api);
        match self.backend {
            Backend::Direct(b) => b.shutdown().await,
            Backend::Tcp(b) => b.shutdown().await,
        }
    }
}

struct DropBomb;

impl Drop for DropBomb {
    fn drop(&mut self) {
        eprintln!("@TestAuthor: You should call `ctx.finish().await` to shut the reservation system down");
    }
}
