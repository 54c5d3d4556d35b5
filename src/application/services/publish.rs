//! Publish service: build the package and upload it to the package index

use std::sync::Arc;

use tracing::{info, instrument};

use crate::application::services::ToolChain;
use crate::application::Credentials;
use crate::config::Settings;
use crate::domain::{Arg, Secret, ToolStep};
use crate::infrastructure::traits::{CommandRunner, EnvReader};
use crate::infrastructure::InfraResult;

/// Uploads a release. The upload is irreversible, so credentials are
/// validated before the tool is started.
pub struct PublishService {
    chain: ToolChain,
    env: Arc<dyn EnvReader>,
    settings: Arc<Settings>,
}

impl PublishService {
    pub fn new(
        cmd: Arc<dyn CommandRunner>,
        env: Arc<dyn EnvReader>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            chain: ToolChain::new(cmd),
            env,
            settings,
        }
    }

    /// The upload invocation for the given credentials. Both values are
    /// secret args, so logging the step reveals neither.
    pub fn step(&self, credentials: &Credentials) -> ToolStep {
        let publish = &self.settings.publish;
        publish
            .tool
            .to_step()
            .arg(publish.username_flag.as_str())
            .arg(Arg::Secret(Secret::new(credentials.username.as_str())))
            .arg(publish.password_flag.as_str())
            .arg(Arg::Secret(credentials.password.clone()))
    }

    /// Load credentials, then run the upload tool once.
    #[instrument(skip(self))]
    pub fn run(&self) -> InfraResult<()> {
        let credentials = Credentials::load(self.env.as_ref())?;
        info!("publish: credentials loaded");
        let step = self.step(&credentials);
        self.chain.run_step(&step, &self.settings.project_dir)
    }
}
