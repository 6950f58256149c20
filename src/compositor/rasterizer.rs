// Rasterizer - paints prerolled frames on a dedicated thread
// Frames move in over a channel; recorded commands and the paint result come back.

use super::layer_tree::PrerolledFrame;
use super::layers::{DrawCommand, RecordingCanvas};
use crate::error::{LayerError, LayerResult};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

/// What the raster thread produced for one frame.
#[derive(Debug)]
pub struct RasterOutput {
    pub frame_number: u64,
    pub commands: Vec<DrawCommand>,
    pub result: LayerResult,
}

/// Owns the raster thread. Frames move in, recorded commands come back.
pub struct Rasterizer {
    frames: Option<Sender<PrerolledFrame>>,
    outputs: Receiver<RasterOutput>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Rasterizer {
    /// Start the raster loop on a dedicated thread.
    pub fn spawn() -> io::Result<Self> {
        let (frame_tx, frame_rx) = mpsc::channel::<PrerolledFrame>();
        let (output_tx, output_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("raster".into())
            .spawn(move || {
                for frame in frame_rx {
                    let mut canvas = RecordingCanvas::new();
                    let result = frame.paint(&mut canvas);
                    if let Err(err) = &result {
                        log::error!("[Rasterizer] frame {} failed: {err}", frame.frame_number());
                    }
                    let output = RasterOutput {
                        frame_number: frame.frame_number(),
                        commands: canvas.take_commands(),
                        result,
                    };
                    if output_tx.send(output).is_err() {
                        break;
                    }
                }
                log::debug!("[Rasterizer] raster thread exiting");
            })?;

        Ok(Self {
            frames: Some(frame_tx),
            outputs: output_rx,
            handle: Some(handle),
        })
    }

    /// Hands a frame to the raster thread.
    pub fn submit(&self, frame: PrerolledFrame) -> LayerResult {
        let frames = self.frames.as_ref().ok_or(LayerError::RasterThreadGone)?;
        frames.send(frame).map_err(|_| LayerError::RasterThreadGone)
    }

    /// Blocks until the next frame has been painted.
    pub fn recv(&self) -> LayerResult<RasterOutput> {
        self.outputs.recv().map_err(|_| LayerError::RasterThreadGone)
    }

    pub fn try_recv(&self) -> LayerResult<Option<RasterOutput>> {
        match self.outputs.try_recv() {
            Ok(output) => Ok(Some(output)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(LayerError::RasterThreadGone),
        }
    }

    /// Finishes queued frames and joins the thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        // Dropping the sender ends the thread's receive loop.
        self.frames.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("[Rasterizer] raster thread panicked");
            }
        }
    }
}

impl Drop for Rasterizer {
    fn drop(&mut self) {
        self.stop();
    }
}
