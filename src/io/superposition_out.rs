//! JSON writer for a resolved [`SuperpositionContext`]: one rigid transform per structure name.

use serde::Serialize;

use crate::error::{Context, CustomError, Error, ErrorKind};
use crate::superpose::SuperpositionContext;

#[derive(Serialize)]
struct SuperpositionDoc<'a> {
    transformations: Vec<StructureEntry<'a>>,
}

#[derive(Serialize)]
struct StructureEntry<'a> {
    name: &'a str,
    rotation: [[f64; 3]; 3],
    translation: Translation,
}

#[derive(Serialize)]
struct Translation {
    x: f64,
    y: f64,
    z: f64,
}

/// Render a [`SuperpositionContext`] as pretty-printed JSON, naming each transform by `names[i]`.
///
/// # Errors
/// [`ErrorKind::InvalidScore`] if serialisation fails (only possible for non-finite values, since
/// the shape itself is always valid).
pub fn write_superposition_json(ctx: &SuperpositionContext, names: &[String]) -> Result<String, Error> {
    let transformations = ctx
        .transforms
        .iter()
        .zip(names)
        .map(|(transform, name)| StructureEntry {
            name,
            rotation: std::array::from_fn(|r| std::array::from_fn(|c| transform.rotation[(r, c)])),
            translation: Translation {
                x: transform.translation[0],
                y: transform.translation[1],
                z: transform.translation[2],
            },
        })
        .collect();
    let doc = SuperpositionDoc { transformations };
    serde_json::to_string_pretty(&doc).map_err(|e| {
        Error::with_context(
            ErrorKind::InvalidScore,
            CustomError::error("failed to serialise superposition", e.to_string(), Context::none()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::superpose::RigidTransform;

    #[test]
    fn serialises_one_identity_structure() {
        let ctx = SuperpositionContext {
            transforms: vec![RigidTransform::identity()],
            order: Vec::new(),
        };
        let json = write_superposition_json(&ctx, &["domain-a".to_string()]).unwrap();
        assert!(json.contains("domain-a"));
        assert!(json.contains("\"rotation\""));
        assert!(json.contains("\"transformations\""));
        assert!(json.contains("\"x\""));
    }
}
