//! # 音频模块
//!
//! 脚本的 `loadAudio` / `playAudio` / `stopAudio` / `unloadAudio` 作用于一个定长
//! 槽位表。输出设备在第一次加载声音时才打开。
//!
//! 槽位状态：`loaded → playing → stopped → playing → …`，`unloadAudio` 后释放。

pub mod backend;
pub mod slots;

use std::path::{Path, PathBuf};

use crate::config::AudioConfig;
use crate::core::{AudioError, AudioResult};

#[cfg(feature = "native")]
pub use backend::RodioBackend;
pub use backend::{AudioBackend, PlayRecord, SilentBackend, SilentProbe};
pub use slots::{SlotTable, SoundHandle};

/// 惰性创建后端的工厂
pub type BackendFactory = Box<dyn FnMut() -> AudioResult<Box<dyn AudioBackend>>>;

/// 按配置选择后端：静音时使用 `SilentBackend`，否则打开默认输出设备
pub fn default_backend_factory(config: &AudioConfig) -> BackendFactory {
    let muted = config.muted;
    Box::new(move || {
        if muted {
            return Ok(Box::new(SilentBackend::new()) as Box<dyn AudioBackend>);
        }
        #[cfg(feature = "native")]
        {
            Ok(Box::new(RodioBackend::new()?) as Box<dyn AudioBackend>)
        }
        #[cfg(not(feature = "native"))]
        {
            Err(AudioError::DeviceInit(
                "built without the `native` feature".to_string(),
            ))
        }
    })
}

#[derive(Debug, Clone)]
struct SoundEntry {
    path: PathBuf,
}

pub struct AudioFacade {
    master_volume: f32,
    factory: BackendFactory,
    backend: Option<Box<dyn AudioBackend>>,
    sounds: SlotTable<SoundEntry>,
}

impl std::fmt::Debug for AudioFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioFacade")
            .field("master_volume", &self.master_volume)
            .field("initialized", &self.backend.is_some())
            .field("sounds", &self.sounds.len())
            .finish()
    }
}

impl AudioFacade {
    pub fn new(config: &AudioConfig, factory: BackendFactory) -> Self {
        Self {
            master_volume: config.master_volume,
            factory,
            backend: None,
            sounds: SlotTable::new(config.max_sounds),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.backend.is_some()
    }

    pub fn capacity(&self) -> usize {
        self.sounds.capacity()
    }

    pub fn loaded(&self) -> usize {
        self.sounds.len()
    }

    fn backend(&mut self) -> AudioResult<&mut dyn AudioBackend> {
        if self.backend.is_none() {
            self.backend = Some((self.factory)()?);
        }
        match self.backend.as_deref_mut() {
            Some(backend) => Ok(backend),
            None => Err(AudioError::DeviceInit("audio backend unavailable".to_string())),
        }
    }

    fn check(&self, handle: SoundHandle) -> AudioResult<()> {
        if self.sounds.contains(handle) {
            Ok(())
        } else {
            Err(AudioError::InvalidHandle(handle.raw()))
        }
    }

    /// 已加载同一路径时返回原句柄；表满时失败且不影响已有槽位
    pub fn load(&mut self, path: &Path) -> AudioResult<SoundHandle> {
        if let Some((handle, _)) = self.sounds.iter().find(|(_, s)| s.path == path) {
            tracing::debug!(target: "audio", path = %path.display(), handle = handle.raw(), "sound already loaded");
            return Ok(handle);
        }

        let handle = self.sounds.next_handle()?;
        self.backend()?.load(handle.raw(), path)?;
        let inserted = self.sounds.insert(SoundEntry {
            path: path.to_path_buf(),
        })?;
        debug_assert_eq!(inserted, handle);
        tracing::info!(target: "audio", path = %path.display(), handle = handle.raw(), "sound loaded");
        Ok(handle)
    }

    /// 停止槽位之前的声部，以 `volume * master_volume` 重新播放
    pub fn play(&mut self, handle: SoundHandle, volume: f32, looped: bool) -> AudioResult<()> {
        self.check(handle)?;
        let volume = volume.max(0.0) * self.master_volume;
        self.backend()?.play(handle.raw(), volume, looped)
    }

    pub fn stop(&mut self, handle: SoundHandle) -> AudioResult<()> {
        self.check(handle)?;
        self.backend()?.stop(handle.raw());
        Ok(())
    }

    /// 停止播放并释放槽位，之后该句柄失效
    pub fn unload(&mut self, handle: SoundHandle) -> AudioResult<()> {
        let entry = self
            .sounds
            .remove(handle)
            .ok_or(AudioError::InvalidHandle(handle.raw()))?;
        if let Some(backend) = self.backend.as_deref_mut() {
            backend.unload(handle.raw());
        }
        tracing::debug!(target: "audio", path = %entry.path.display(), handle = handle.raw(), "sound unloaded");
        Ok(())
    }

    pub fn is_playing(&self, handle: SoundHandle) -> bool {
        self.sounds.contains(handle)
            && self
                .backend
                .as_deref()
                .map(|b| b.is_playing(handle.raw()))
                .unwrap_or(false)
    }

    /// 停止所有声音
    pub fn stop_all(&mut self) {
        let handles: Vec<_> = self.sounds.iter().map(|(h, _)| h).collect();
        if let Some(backend) = self.backend.as_deref_mut() {
            for handle in handles {
                backend.stop(handle.raw());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn silent(capacity: usize) -> (AudioFacade, SilentProbe, Rc<Cell<usize>>) {
        let backend = SilentBackend::new();
        let probe = backend.probe();
        let mut backend = Some(backend);
        let opened = Rc::new(Cell::new(0));
        let counter = Rc::clone(&opened);
        let factory: BackendFactory = Box::new(move || {
            counter.set(counter.get() + 1);
            backend
                .take()
                .map(|b| Box::new(b) as Box<dyn AudioBackend>)
                .ok_or_else(|| AudioError::DeviceInit("opened twice".to_string()))
        });
        let config = AudioConfig {
            master_volume: 0.5,
            max_sounds: capacity,
            muted: false,
        };
        (AudioFacade::new(&config, factory), probe, opened)
    }

    fn write_sounds(dir: &Path, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| {
                let path = dir.join(format!("sound{}.wav", i));
                std::fs::write(&path, b"RIFF").unwrap();
                path
            })
            .collect()
    }

    #[test]
    fn test_backend_opened_lazily_once() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_sounds(dir.path(), 2);
        let (mut audio, _probe, opened) = silent(4);
        assert!(!audio.is_initialized());
        audio.load(&paths[0]).unwrap();
        audio.load(&paths[1]).unwrap();
        assert_eq!(opened.get(), 1);
    }

    #[test]
    fn test_fifth_load_fails_and_keeps_slots() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_sounds(dir.path(), 5);
        let (mut audio, probe, _) = silent(4);
        let handles: Vec<_> = paths[..4].iter().map(|p| audio.load(p).unwrap()).collect();
        assert_eq!(handles.iter().map(|h| h.raw()).collect::<Vec<_>>(), vec![0, 1, 2, 3]);

        assert_eq!(
            audio.load(&paths[4]),
            Err(AudioError::CapacityExhausted { capacity: 4 })
        );
        assert_eq!(audio.loaded(), 4);
        assert_eq!(probe.loaded(), 4);
        for handle in handles {
            audio.play(handle, 1.0, false).unwrap();
        }
    }

    #[test]
    fn test_same_path_returns_same_handle() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_sounds(dir.path(), 1);
        let (mut audio, _, _) = silent(4);
        let first = audio.load(&paths[0]).unwrap();
        let second = audio.load(&paths[0]).unwrap();
        assert_eq!(first, second);
        assert_eq!(audio.loaded(), 1);
    }

    #[test]
    fn test_play_applies_master_volume() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_sounds(dir.path(), 1);
        let (mut audio, probe, _) = silent(4);
        let handle = audio.load(&paths[0]).unwrap();
        audio.play(handle, 0.8, true).unwrap();
        assert_eq!(
            probe.plays(),
            vec![PlayRecord {
                key: 0,
                volume: 0.4,
                looped: true
            }]
        );
        assert!(audio.is_playing(handle));
        audio.stop(handle).unwrap();
        assert!(!audio.is_playing(handle));
    }

    #[test]
    fn test_unloaded_handle_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_sounds(dir.path(), 2);
        let (mut audio, _, _) = silent(1);
        let first = audio.load(&paths[0]).unwrap();
        audio.unload(first).unwrap();

        assert_eq!(audio.play(first, 1.0, false), Err(AudioError::InvalidHandle(0)));
        assert_eq!(audio.unload(first), Err(AudioError::InvalidHandle(0)));

        let second = audio.load(&paths[1]).unwrap();
        assert_eq!(second.index(), first.index());
        assert_ne!(second, first);
        audio.play(second, 1.0, false).unwrap();
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let (mut audio, _, _) = silent(4);
        let err = audio.load(&dir.path().join("nope.ogg")).unwrap_err();
        assert!(matches!(err, AudioError::FileNotFound(_)));
        assert_eq!(audio.loaded(), 0);
    }

    #[test]
    fn test_muted_factory_is_silent() {
        let config = AudioConfig {
            muted: true,
            ..AudioConfig::default()
        };
        let mut factory = default_backend_factory(&config);
        let backend = factory().unwrap();
        assert!(!backend.is_playing(0));
    }
}
