use std::path::PathBuf;

use incept_core::internal::*;

use crate::extract::OutputBundle;
use crate::params::{NpzParams, RandomParams, Weights};
use crate::topology;

/// Where the per-sample kernels run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Backend {
    #[default]
    Cpu,
    /// A dedicated thread pool of that many threads.
    MultiThread(usize),
}

impl Backend {
    pub fn executor(&self) -> InceptResult<Executor> {
        match self {
            Backend::Cpu => Ok(Executor::SingleThread),
            Backend::MultiThread(n) => Executor::multithread_with_name(*n, "incept-googlenet"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub weights: Weights,
    pub backend: Backend,
}

impl EngineConfig {
    pub fn with_weights(self, weights: Weights) -> EngineConfig {
        EngineConfig { weights, ..self }
    }

    pub fn with_npz(self, path: impl Into<PathBuf>) -> EngineConfig {
        self.with_weights(Weights::Npz(path.into()))
    }

    pub fn with_seed(self, seed: u64) -> EngineConfig {
        self.with_weights(Weights::Random { seed })
    }

    pub fn with_backend(self, backend: Backend) -> EngineConfig {
        EngineConfig { backend, ..self }
    }
}

/// A frozen GoogLeNet, ready to evaluate.
///
/// Cloning is cheap: the graph and its parameters are shared.
#[derive(Debug, Clone)]
pub struct GoogLeNet {
    model: Arc<RunnableModel>,
    session: SessionState,
}

impl GoogLeNet {
    pub fn new(config: &EngineConfig) -> InceptResult<GoogLeNet> {
        let graph = match &config.weights {
            Weights::Random { seed } => {
                debug!("Building GoogLeNet with random weights (seed {})", seed);
                topology::build(&mut RandomParams::new(*seed))?
            }
            Weights::Npz(path) => {
                debug!("Building GoogLeNet with weights from {}", path.display());
                topology::build(&mut NpzParams::open(path)?)
                    .with_context(|| format!("Loading weights from {}", path.display()))?
            }
        };
        let model = Arc::new(graph.into_runnable()?);
        let session = SessionState::new(config.backend.executor()?);
        Ok(GoogLeNet { model, session })
    }

    /// The same network, evaluated on another executor.
    pub fn with_executor(&self, executor: Executor) -> GoogLeNet {
        GoogLeNet { model: Arc::clone(&self.model), session: SessionState::new(executor) }
    }

    pub fn executor(&self) -> &Executor {
        &self.session.executor
    }

    pub fn model(&self) -> &RunnableModel {
        &self.model
    }

    /// Names of the 21 layers `forward` can return.
    pub fn available_layers(&self) -> Vec<&str> {
        self.model.layer_names().collect()
    }

    /// Whether images can be resized, so whether `extract` with a size and
    /// `predict` can work at all.
    pub fn can_resize(&self) -> bool {
        crate::available()
    }

    /// The partial evaluation for these layers. No layer at all means `prob`.
    pub fn plan(&self, layers: &[&str]) -> InceptResult<SimplePlan<'_>> {
        if layers.is_empty() {
            SimplePlan::new_for_outputs(&self.model, &["prob"])
        } else {
            SimplePlan::new_for_outputs(&self.model, layers)
        }
    }

    /// Evaluate the requested layers on a `(N, 3, H, W)` batch.
    pub fn forward(&self, x: Tensor, layers: &[&str]) -> InceptResult<OutputBundle> {
        let plan = self.plan(layers)?;
        self.run_plan(&plan, x)
    }

    pub(crate) fn run_plan(&self, plan: &SimplePlan<'_>, x: Tensor) -> InceptResult<OutputBundle> {
        debug!("Forward pass on {:?} for {} layer(s)", x.shape(), plan.outputs.len());
        let values = plan.run(&self.session, tvec!(x))?;
        Ok(plan
            .outputs
            .iter()
            .zip(values)
            .map(|(&id, value)| (self.model.node(id).name.clone(), value.into_tensor()))
            .collect())
    }

    /// Output shapes of the requested layers for one image of the given
    /// `(height, width)`, without computing anything.
    pub fn layer_shapes(
        &self,
        input_hw: (usize, usize),
        layers: &[&str],
    ) -> InceptResult<Vec<(String, TVec<usize>)>> {
        let plan = self.plan(layers)?;
        let shapes = plan.output_shapes(&[&[1, 3, input_hw.0, input_hw.1]])?;
        Ok(plan
            .outputs
            .iter()
            .zip(shapes)
            .map(|(&id, shape)| (self.model.node(id).name.clone(), shape))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builders() {
        let config = EngineConfig::default().with_seed(12).with_backend(Backend::MultiThread(2));
        assert_eq!(config.weights, Weights::Random { seed: 12 });
        assert_eq!(config.backend, Backend::MultiThread(2));
        let config = config.with_npz("weights.npz");
        assert_eq!(config.weights, Weights::Npz("weights.npz".into()));
    }

    #[test]
    fn missing_npz_fails_at_construction() {
        let config = EngineConfig::default().with_npz("/nonexistent/googlenet.npz");
        assert!(GoogLeNet::new(&config).is_err());
    }

    #[test]
    fn executors_share_the_model() {
        let net = GoogLeNet::new(&EngineConfig::default()).unwrap();
        let other = net.with_executor(Executor::multithread(2).unwrap());
        assert!(Arc::ptr_eq(&net.model, &other.model));
        assert_eq!(other.executor().threads(), 2);
        assert_eq!(net.executor().threads(), 1);
    }
}
