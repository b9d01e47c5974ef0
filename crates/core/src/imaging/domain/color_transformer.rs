use super::color_plan::ColorPlan;
use super::working_image::WorkingImage;
use crate::shared::error::BoxError;

/// Runs a [`ColorPlan`] through an external color-management engine.
pub trait ColorTransformer: Send + Sync {
    fn apply(&self, image: WorkingImage, plan: &ColorPlan) -> Result<WorkingImage, BoxError>;
}
