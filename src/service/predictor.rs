//! Random-record prediction.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::artifacts::InferenceContext;
use crate::error::{Result, ServeError};
use crate::ml::argmax;

/// One served prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Row index in the held-out dataset.
    pub index: usize,
    /// The original, unencoded row rendered as a table.
    pub display_row: String,
    pub label: String,
}

/// Pick a row index uniformly from `[0, rows)`.
pub fn pick_index<R: Rng + ?Sized>(rows: usize, rng: &mut R) -> Result<usize> {
    if rows == 0 {
        return Err(ServeError::EmptyDataset);
    }
    Ok(rng.gen_range(0..rows))
}

/// Run the row at `index` through preprocessing and the network.
pub fn predict_row(ctx: &InferenceContext, index: usize) -> Result<Prediction> {
    let row = ctx.dataset.row(index)?;
    let input = ctx.pipeline().run(&row)?;

    let logits = ctx.network.forward(&input.tensor)?;
    let class = logits
        .first()
        .and_then(|l| argmax(l))
        .ok_or_else(|| ServeError::Internal("network produced no logits".to_string()))?;
    let label = ctx.labels.label(class)?.to_string();
    debug!(index, class, %label, "Predicted");

    Ok(Prediction {
        index,
        display_row: ctx.dataset.render_row(index)?,
        label,
    })
}

/// Predict a uniformly random row of the held-out dataset.
pub fn predict<R: Rng + ?Sized>(ctx: &InferenceContext, rng: &mut R) -> Result<Prediction> {
    let index = pick_index(ctx.dataset.len(), rng)?;
    predict_row(ctx, index)
}

/// Shared predictor: immutable artifacts plus a seedable row picker.
pub struct Predictor {
    ctx: Arc<InferenceContext>,
    rng: Mutex<StdRng>,
}

impl Predictor {
    pub fn new(ctx: Arc<InferenceContext>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            ctx,
            rng: Mutex::new(rng),
        }
    }

    pub fn context(&self) -> &InferenceContext {
        &self.ctx
    }

    fn next_index(&self) -> Result<usize> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| ServeError::Internal("row picker lock poisoned".to_string()))?;
        pick_index(self.ctx.dataset.len(), &mut *rng)
    }

    pub fn predict_random(&self) -> Result<Prediction> {
        let index = self.next_index()?;
        predict_row(&self.ctx, index)
    }
}
