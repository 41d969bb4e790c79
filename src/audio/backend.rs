//! 音频后端
//!
//! 后端以槽位句柄为键保存已解码的声音和正在播放的声部。

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use crate::core::{AudioError, AudioResult};

pub trait AudioBackend {
    /// 读取并校验音频文件，以 `key` 保存
    fn load(&mut self, key: u32, path: &Path) -> AudioResult<()>;
    /// 停止 `key` 当前的声部并开始新的播放
    fn play(&mut self, key: u32, volume: f32, looped: bool) -> AudioResult<()>;
    fn stop(&mut self, key: u32);
    /// 停止并丢弃已解码的数据
    fn unload(&mut self, key: u32);
    fn is_playing(&self, key: u32) -> bool;
}

fn read_audio_file(path: &Path) -> AudioResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => AudioError::FileNotFound(path.display().to_string()),
        _ => AudioError::DecodeFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        },
    })
}

#[cfg(feature = "native")]
pub use native::RodioBackend;

#[cfg(feature = "native")]
mod native {
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::path::Path;
    use std::sync::Arc;

    use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

    use super::{read_audio_file, AudioBackend};
    use crate::core::{AudioError, AudioResult};

    /// rodio 输出设备
    pub struct RodioBackend {
        stream: OutputStream,
        clips: HashMap<u32, Arc<[u8]>>,
        sinks: HashMap<u32, Sink>,
    }

    impl RodioBackend {
        pub fn new() -> AudioResult<Self> {
            let stream = OutputStreamBuilder::open_default_stream()
                .map_err(|e| AudioError::DeviceInit(e.to_string()))?;
            tracing::info!(target: "audio", "audio device opened");
            Ok(Self {
                stream,
                clips: HashMap::new(),
                sinks: HashMap::new(),
            })
        }

        fn decoder(data: &Arc<[u8]>) -> Result<Decoder<Cursor<Arc<[u8]>>>, String> {
            Decoder::new(Cursor::new(Arc::clone(data))).map_err(|e| e.to_string())
        }
    }

    impl AudioBackend for RodioBackend {
        fn load(&mut self, key: u32, path: &Path) -> AudioResult<()> {
            let data: Arc<[u8]> = read_audio_file(path)?.into();
            Self::decoder(&data).map_err(|reason| AudioError::DecodeFailed {
                path: path.display().to_string(),
                reason,
            })?;
            self.clips.insert(key, data);
            Ok(())
        }

        fn play(&mut self, key: u32, volume: f32, looped: bool) -> AudioResult<()> {
            if let Some(sink) = self.sinks.remove(&key) {
                sink.stop();
            }
            let data = self.clips.get(&key).ok_or(AudioError::InvalidHandle(key))?;
            let source = Self::decoder(data).map_err(AudioError::Playback)?;

            let sink = Sink::connect_new(self.stream.mixer());
            sink.set_volume(volume);
            if looped {
                sink.append(source.repeat_infinite());
            } else {
                sink.append(source);
            }
            self.sinks.insert(key, sink);
            Ok(())
        }

        fn stop(&mut self, key: u32) {
            if let Some(sink) = self.sinks.remove(&key) {
                sink.stop();
            }
        }

        fn unload(&mut self, key: u32) {
            self.stop(key);
            self.clips.remove(&key);
        }

        fn is_playing(&self, key: u32) -> bool {
            self.sinks.get(&key).map(|s| !s.is_paused() && !s.empty()).unwrap_or(false)
        }
    }
}

/// 一次播放请求
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayRecord {
    pub key: u32,
    pub volume: f32,
    pub looped: bool,
}

#[derive(Debug, Default)]
struct SilentState {
    clips: HashMap<u32, usize>,
    playing: HashMap<u32, bool>,
    plays: Vec<PlayRecord>,
}

/// 不输出声音的后端：只读取文件并记录播放请求
///
/// 非循环播放一直视为“播放中”，直到 `stop` 或下一次 `play`。
#[derive(Debug, Default)]
pub struct SilentBackend {
    state: Rc<RefCell<SilentState>>,
}

/// 查看 `SilentBackend` 收到的请求
#[derive(Debug, Clone)]
pub struct SilentProbe {
    state: Rc<RefCell<SilentState>>,
}

impl SilentBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probe(&self) -> SilentProbe {
        SilentProbe {
            state: Rc::clone(&self.state),
        }
    }
}

impl AudioBackend for SilentBackend {
    fn load(&mut self, key: u32, path: &Path) -> AudioResult<()> {
        let data = read_audio_file(path)?;
        if data.is_empty() {
            return Err(AudioError::DecodeFailed {
                path: path.display().to_string(),
                reason: "empty file".to_string(),
            });
        }
        self.state.borrow_mut().clips.insert(key, data.len());
        Ok(())
    }

    fn play(&mut self, key: u32, volume: f32, looped: bool) -> AudioResult<()> {
        let mut state = self.state.borrow_mut();
        if !state.clips.contains_key(&key) {
            return Err(AudioError::InvalidHandle(key));
        }
        state.playing.insert(key, looped);
        state.plays.push(PlayRecord { key, volume, looped });
        Ok(())
    }

    fn stop(&mut self, key: u32) {
        self.state.borrow_mut().playing.remove(&key);
    }

    fn unload(&mut self, key: u32) {
        let mut state = self.state.borrow_mut();
        state.playing.remove(&key);
        state.clips.remove(&key);
    }

    fn is_playing(&self, key: u32) -> bool {
        self.state.borrow().playing.contains_key(&key)
    }
}

impl SilentProbe {
    pub fn plays(&self) -> Vec<PlayRecord> {
        self.state.borrow().plays.clone()
    }

    pub fn loaded(&self) -> usize {
        self.state.borrow().clips.len()
    }

    pub fn is_playing(&self, key: u32) -> bool {
        self.state.borrow().playing.contains_key(&key)
    }
}
