use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use glam::Vec2;
use macroquad::{
    math::{Rect as MacroquadRect, Vec2 as MacroquadVec2},
    texture::{self, DrawTextureParams, Texture2D},
};
use tallgrass_core::SpriteKey;
use tallgrass_rendering::Color;

use crate::to_macroquad_color;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;
const ALL_SPRITE_KEYS: [SpriteKey; 11] = [
    SpriteKey::Background,
    SpriteKey::Foreground,
    SpriteKey::PlayerUp,
    SpriteKey::PlayerLeft,
    SpriteKey::PlayerDown,
    SpriteKey::PlayerRight,
    SpriteKey::Villager,
    SpriteKey::Vendor,
    SpriteKey::BattleBackground,
    SpriteKey::Emby,
    SpriteKey::Draggle,
];

/// Parameters describing how a sprite should be drawn on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DrawParams {
    /// Position in screen-space pixels where the sprite's top-left corner is placed.
    pub(crate) position: Vec2,
    /// Desired size in screen-space pixels, `None` for the frame's native size times `scale`.
    pub(crate) size: Option<Vec2>,
    /// Viewport scale applied to native sizes.
    pub(crate) scale: f32,
    /// Frame drawn from a horizontal sheet.
    pub(crate) frame: u32,
    /// Number of frames in the sheet.
    pub(crate) frames: u32,
    /// Tint applied to the sprite.
    pub(crate) tint: Color,
}

/// Cache of textures loaded from the sprite manifest.
#[derive(Debug)]
pub(crate) struct SpriteAtlas {
    textures: HashMap<SpriteKey, Texture2D>,
}

impl SpriteAtlas {
    /// Loads sprites from the manifest located at the provided path.
    pub(crate) fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_manifest_with_loader(path, default_loader)
    }

    /// Returns the default manifest path relative to the repository root.
    #[must_use]
    pub(crate) fn default_manifest_path() -> PathBuf {
        PathBuf::from("assets/manifest.toml")
    }

    /// Draws the requested sprite using the supplied parameters.
    pub(crate) fn draw(&self, key: SpriteKey, params: DrawParams) -> Result<()> {
        let texture = *self
            .textures
            .get(&key)
            .with_context(|| format!("sprite {key:?} missing from atlas"))?;

        let frames = params.frames.max(1);
        let frame_width = texture.width() / frames as f32;
        let source = MacroquadRect::new(
            frame_width * params.frame.min(frames - 1) as f32,
            0.0,
            frame_width,
            texture.height(),
        );
        let size = params
            .size
            .unwrap_or_else(|| Vec2::new(frame_width, texture.height()) * params.scale);

        let draw_params = DrawTextureParams {
            dest_size: Some(MacroquadVec2::new(size.x, size.y)),
            source: Some(source),
            ..DrawTextureParams::default()
        };

        texture::draw_texture_ex(
            texture,
            params.position.x,
            params.position.y,
            to_macroquad_color(params.tint),
            draw_params,
        );

        Ok(())
    }

    /// Returns whether the atlas contains the provided key.
    #[must_use]
    pub(crate) fn contains(&self, key: SpriteKey) -> bool {
        self.textures.contains_key(&key)
    }

    fn from_manifest_with_loader(
        path: impl AsRef<Path>,
        mut loader: impl FnMut(SpriteKey, &Path) -> Result<Texture2D>,
    ) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read sprite manifest at {}",
                manifest_path.display()
            )
        })?;
        let base = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let entries = parse_manifest(&contents, &base)?;
        Self::from_entries(entries, &mut loader)
    }

    fn from_entries(
        entries: Vec<(SpriteKey, PathBuf)>,
        loader: &mut impl FnMut(SpriteKey, &Path) -> Result<Texture2D>,
    ) -> Result<Self> {
        let mut textures = HashMap::with_capacity(entries.len());
        for (key, path) in entries {
            let texture = loader(key, &path).with_context(|| {
                format!("failed to load sprite {key:?} from {}", path.display())
            })?;
            if textures.insert(key, texture).is_some() {
                bail!("duplicate sprite entry for {key:?}");
            }
        }
        Ok(Self { textures })
    }
}

fn default_loader(_key: SpriteKey, path: &Path) -> Result<Texture2D> {
    let bytes = fs::read(path)
        .with_context(|| format!("failed to read sprite asset at {}", path.display()))?;
    Ok(Texture2D::from_file_with_format(&bytes, None))
}

#[derive(Debug, serde::Deserialize)]
struct Manifest {
    version: u32,
    sprites: HashMap<String, String>,
}

fn parse_manifest(contents: &str, base_path: &Path) -> Result<Vec<(SpriteKey, PathBuf)>> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse sprite manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported sprite manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }

    let mut resolved = HashMap::new();
    for (name, relative_path) in manifest.sprites {
        let key = parse_sprite_key(&name)
            .with_context(|| format!("unknown sprite key `{name}` in manifest"))?;
        let path = base_path.join(relative_path);
        if resolved.insert(key, path).is_some() {
            bail!("sprite manifest contains duplicate entry for {key:?}");
        }
    }

    let mut ordered = Vec::with_capacity(ALL_SPRITE_KEYS.len());
    for key in ALL_SPRITE_KEYS {
        let Some(path) = resolved.remove(&key) else {
            bail!("sprite manifest missing entry for {key:?}");
        };
        ordered.push((key, path));
    }

    Ok(ordered)
}

fn parse_sprite_key(name: &str) -> Result<SpriteKey> {
    ALL_SPRITE_KEYS
        .into_iter()
        .find(|key| format!("{key:?}") == name)
        .with_context(|| format!("unknown sprite key `{name}`"))
}
