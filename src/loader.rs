use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;

use crate::config::AssetEntry;

/// A successfully parsed asset, ready to be spawned into the scene graph.
pub struct LoadedAsset {
    pub name: String,
    pub document: gltf::Document,
    pub buffers: Vec<gltf::buffer::Data>,
}

enum LoadMessage {
    Loaded(LoadedAsset),
    Failed { name: String, reason: String },
}

/// Counted all-or-nothing completion barrier over a known total. Failures
/// count toward completion so a bad asset can never stall the barrier, and
/// the fire signal is consumed exactly once.
pub struct LoadBarrier {
    total: usize,
    completed: usize,
    failed: Vec<String>,
    fired: bool,
}

impl LoadBarrier {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: 0,
            failed: Vec::new(),
            fired: false,
        }
    }

    pub fn record_success(&mut self) {
        self.completed += 1;
    }

    pub fn record_failure(&mut self, name: impl Into<String>) {
        self.completed += 1;
        self.failed.push(name.into());
    }

    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }

    #[allow(dead_code)]
    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    /// True exactly once: the first poll after every tracked load has
    /// finished, success or failure.
    pub fn take_fire(&mut self) -> bool {
        if self.fired || !self.is_complete() {
            return false;
        }
        self.fired = true;
        true
    }
}

/// Issues all loads in parallel on the runtime and funnels completions back
/// to the frame loop through a channel. Completion order is whatever the
/// filesystem gives us; only the count matters.
pub struct AssetLoader {
    receiver: Receiver<LoadMessage>,
    pub barrier: LoadBarrier,
}

impl AssetLoader {
    pub fn spawn(
        handle: &tokio::runtime::Handle,
        assets: &[AssetEntry],
        load_timeout: Duration,
    ) -> Self {
        let (sender, receiver) = std::sync::mpsc::channel();

        for entry in assets {
            let name = entry.name.clone();
            let path = entry.path.clone();
            let sender: Sender<LoadMessage> = sender.clone();

            handle.spawn(async move {
                let import = tokio::task::spawn_blocking({
                    let path = path.clone();
                    move || gltf::import(&path)
                });

                let message = match tokio::time::timeout(load_timeout, import).await {
                    Ok(Ok(Ok((document, buffers, _images)))) => LoadMessage::Loaded(LoadedAsset {
                        name,
                        document,
                        buffers,
                    }),
                    Ok(Ok(Err(error))) => LoadMessage::Failed {
                        name,
                        reason: format!("{} ({})", error, path.display()),
                    },
                    Ok(Err(join_error)) => LoadMessage::Failed {
                        name,
                        reason: format!("load task panicked: {}", join_error),
                    },
                    Err(_) => LoadMessage::Failed {
                        name,
                        reason: format!("timed out after {:?}", load_timeout),
                    },
                };

                // The receiver going away just means the stage shut down
                // mid-load.
                let _ = sender.send(message);
            });
        }

        Self {
            receiver,
            barrier: LoadBarrier::new(assets.len()),
        }
    }

    /// Drains finished loads. Called once per frame; failures are reported
    /// here and recorded against the barrier.
    pub fn poll(&mut self) -> Vec<LoadedAsset> {
        let mut loaded = Vec::new();

        while let Ok(message) = self.receiver.try_recv() {
            match message {
                LoadMessage::Loaded(asset) => {
                    log::info!("asset loaded: {}", asset.name);
                    self.barrier.record_success();
                    loaded.push(asset);
                }
                LoadMessage::Failed { name, reason } => {
                    log::error!("asset load failed: {}: {}", name, reason);
                    self.barrier.record_failure(name);
                }
            }
        }

        loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use glam::Vec3;

    #[test]
    fn barrier_fires_exactly_once_after_all_complete() {
        let mut barrier = LoadBarrier::new(2);
        assert!(!barrier.take_fire());

        barrier.record_success();
        assert!(!barrier.take_fire());

        barrier.record_success();
        assert!(barrier.take_fire());
        assert!(!barrier.take_fire());
    }

    #[test]
    fn failures_count_toward_completion() {
        let mut barrier = LoadBarrier::new(2);
        barrier.record_failure("bear");
        assert!(!barrier.take_fire());

        barrier.record_success();
        assert!(barrier.take_fire());
        assert_eq!(barrier.failed(), &["bear".to_string()]);
    }

    #[test]
    fn empty_asset_list_fires_immediately() {
        let mut barrier = LoadBarrier::new(0);
        assert!(barrier.take_fire());
        assert!(!barrier.take_fire());
    }

    #[test]
    fn missing_files_fail_without_stalling_the_barrier() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let assets = vec![
            AssetEntry {
                name: "bear".to_string(),
                path: PathBuf::from("does/not/exist/bear.glb"),
                rest_offset: Vec3::new(5.0, 0.0, 0.0),
            },
            AssetEntry {
                name: "dog".to_string(),
                path: PathBuf::from("does/not/exist/dog.glb"),
                rest_offset: Vec3::new(-5.0, 0.0, 0.0),
            },
        ];

        let mut loader =
            AssetLoader::spawn(runtime.handle(), &assets, Duration::from_secs(5));

        let mut fired = false;
        for _ in 0..500 {
            loader.poll();
            if loader.barrier.take_fire() {
                fired = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }

        assert!(fired, "barrier never fired");
        assert_eq!(loader.barrier.failed().len(), 2);
        assert!(!loader.barrier.take_fire());
    }
}
