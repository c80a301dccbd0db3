/**
 * This module contains buffer creation and the loading of vertex data from external files.
 */
pub mod buffer;

use std::io::{BufReader, Cursor};

use anyhow::Context as _;

use crate::data_structures::geometry::FLOATS_PER_VERTEX;

/// Grey used for meshes without normals.
const DEFAULT_SHADE: [f32; 3] = [0.8, 0.8, 0.8];

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("no window")?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow::anyhow!("page has no origin"))?;
    let base = reqwest::Url::parse(&format!("{}/assets/", origin))?;
    Ok(base.join(file_name)?)
}

/// Reads a text asset: `./assets/<file_name>` natively, `<origin>/assets/<file_name>` on the web.
pub async fn load_string(file_name: &str) -> anyhow::Result<String> {
    #[cfg(target_arch = "wasm32")]
    let txt = {
        let url = format_url(file_name)?;
        reqwest::get(url).await?.text().await?
    };
    #[cfg(not(target_arch = "wasm32"))]
    let txt = {
        let path = std::path::Path::new("./").join("assets").join(file_name);
        std::fs::read_to_string(&path).with_context(|| format!("cannot read {}", path.display()))?
    };

    Ok(txt)
}

/// Parses OBJ text into an interleaved `[x, y, z, r, g, b]` triangle list.
///
/// Every model in the file is appended in order. Materials are ignored; the
/// colour of a vertex is its normal remapped to 0..1.
pub fn parse_obj_vertices(obj_text: &str) -> anyhow::Result<Vec<f32>> {
    let mut reader = BufReader::new(Cursor::new(obj_text));
    let (models, _) = tobj::load_obj_buf(
        &mut reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_| Err(tobj::LoadError::OpenFileFailed),
    )
    .context("invalid OBJ data")?;

    let mut vertices = Vec::new();
    for model in models {
        let mesh = &model.mesh;
        vertices.reserve(mesh.indices.len() * FLOATS_PER_VERTEX);
        for &index in &mesh.indices {
            let i = index as usize;
            let position = mesh
                .positions
                .get(i * 3..i * 3 + 3)
                .with_context(|| format!("index {} out of range in `{}`", i, model.name))?;
            vertices.extend_from_slice(position);
            match mesh.normals.get(i * 3..i * 3 + 3) {
                Some(normal) => vertices.extend(normal.iter().map(|n| n * 0.5 + 0.5)),
                None => vertices.extend_from_slice(&DEFAULT_SHADE),
            }
        }
    }
    Ok(vertices)
}

/// [`load_string`] followed by [`parse_obj_vertices`].
pub async fn load_obj_vertices(file_name: &str) -> anyhow::Result<Vec<f32>> {
    let text = load_string(file_name).await?;
    let vertices = parse_obj_vertices(&text).with_context(|| format!("loading {}", file_name))?;
    log::info!(
        "loaded {} vertices from {}",
        vertices.len() / FLOATS_PER_VERTEX,
        file_name
    );
    Ok(vertices)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "
o tri
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vn 0.0 0.0 1.0
f 1//1 2//1 3//1
";

    const QUAD: &str = "
o quad
v -1.0 -1.0 0.0
v 1.0 -1.0 0.0
v 1.0 1.0 0.0
v -1.0 1.0 0.0
f 1 2 3 4
";

    #[test]
    fn triangle_becomes_three_vertices() {
        let vertices = parse_obj_vertices(TRIANGLE).unwrap();
        assert_eq!(vertices.len(), 3 * FLOATS_PER_VERTEX);
        assert_eq!(&vertices[6..9], &[1.0, 0.0, 0.0]);
        // +Z normal remapped
        assert_eq!(&vertices[3..6], &[0.5, 0.5, 1.0]);
    }

    #[test]
    fn quads_are_triangulated() {
        let vertices = parse_obj_vertices(QUAD).unwrap();
        assert_eq!(vertices.len(), 6 * FLOATS_PER_VERTEX);
        assert_eq!(&vertices[3..6], &DEFAULT_SHADE);
    }

    #[test]
    fn bundled_asset_parses() {
        let vertices = parse_obj_vertices(include_str!("../../assets/pyramid.obj")).unwrap();
        assert!(!vertices.is_empty());
        assert_eq!(vertices.len() % FLOATS_PER_VERTEX, 0);
    }
}
