//! Operation application
//!
//! Computes the next layer collection from the current one. The input slice is
//! never touched; callers commit the returned collection through history.

use uuid::Uuid;

use crate::error::{Result, StudioError};
use crate::model::{Layer, LayerContent, LayerId, Operation};

/// Fresh layer id for ADD.
pub fn new_layer_id() -> LayerId {
    format!("layer-{}", Uuid::new_v4())
}

fn position_of(layers: &[Layer], id: &str) -> Result<usize> {
    layers
        .iter()
        .position(|l| l.id == id)
        .ok_or_else(|| StudioError::LayerNotFound { id: id.to_string() })
}

/// Apply `op` to a copy of `layers`.
///
/// Returns the new collection and, for ADD, the id assigned to the new layer.
/// Layer order is insertion order; REORDER only changes `z`.
pub fn apply_operation(layers: &[Layer], op: Operation) -> Result<(Vec<Layer>, Option<LayerId>)> {
    let mut next = layers.to_vec();

    match op {
        Operation::Add { layer } => {
            let id = new_layer_id();
            next.push(layer.into_layer(id.clone()));
            return Ok((next, Some(id)));
        }
        Operation::Remove { layer_id } => {
            let index = position_of(&next, &layer_id)?;
            next.remove(index);
        }
        Operation::Reorder { layer_id, new_z } => {
            let index = position_of(&next, &layer_id)?;
            next[index].z = new_z;
        }
        Operation::Transform { layer_id, changes } => {
            let index = position_of(&next, &layer_id)?;
            changes.apply_to(&mut next[index]);
        }
        Operation::Generate {
            layer_id,
            prompt,
            model,
            src,
        } => {
            let index = position_of(&next, &layer_id)?;
            let layer_type = next[index].layer_type();
            let LayerContent::Image(image) = &mut next[index].content else {
                return Err(StudioError::InvalidRequest {
                    reason: format!(
                        "GENERATE targets {} layer \"{}\"; only image layers hold generated content",
                        layer_type, layer_id
                    ),
                });
            };
            image.prompt = Some(prompt);
            image.generation_model = Some(model);
            if let Some(src) = src {
                image.src = src;
            }
        }
    }

    Ok((next, None))
}
