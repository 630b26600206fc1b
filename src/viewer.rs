// SPDX-License-Identifier: GPL-3.0-only

//! Viewer context and main loop
//!
//! [`Viewer`] owns everything one running viewer needs: the open sensor
//! session, the decoded buffers, the mode selector and the renderer. Each
//! loop iteration polls the sensor once, decodes whatever arrived, draws the
//! current mode, presents it and then handles pending input.

use std::fmt::Write;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::constants::STATUS_CAPACITY;
use crate::errors::AppResult;
use crate::pipeline::{DecodeReport, FrameBuffers, FrameDecoder, FrameGeometry};
use crate::render::{
    DisplayMode, DisplaySurface, InputEvent, ModeCommand, ModeRenderer, ModeSelector,
    RenderBackend,
};
use crate::sensor::{CoordinateMapper, FrameReader, SensorSession};

/// Counters kept across ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewerStats {
    pub ticks: u64,
    pub bundles: u64,
    pub depth_frames: u64,
    pub color_frames: u64,
    pub infrared_frames: u64,
    pub body_frames_tracked: u64,
    pub rendered_frames: u64,
    pub render_errors: u64,
}

impl ViewerStats {
    fn record(&mut self, report: &DecodeReport) {
        self.ticks += 1;
        if !report.is_empty() {
            self.bundles += 1;
        }
        self.depth_frames += report.depth as u64;
        self.color_frames += report.color as u64;
        self.infrared_frames += report.infrared as u64;
        self.body_frames_tracked += report.body_slot.is_some() as u64;
    }
}

pub struct Viewer<R, M> {
    session: SensorSession<R, M>,
    decoder: FrameDecoder,
    buffers: FrameBuffers,
    selector: ModeSelector,
    renderer: ModeRenderer,
    stats: ViewerStats,
    status: String,
}

impl<R, M> Viewer<R, M>
where
    R: FrameReader,
    M: CoordinateMapper,
{
    pub fn new(session: SensorSession<R, M>, config: &Config, geometry: FrameGeometry) -> Self {
        info!(
            depth_width = geometry.depth_width,
            depth_height = geometry.depth_height,
            color_width = geometry.color_width,
            color_height = geometry.color_height,
            mode = %config.initial_mode,
            "Viewer initialized"
        );

        Self {
            session,
            decoder: FrameDecoder::new(config.infrared, geometry),
            buffers: FrameBuffers::new(geometry),
            selector: ModeSelector::new(config.initial_mode),
            renderer: ModeRenderer::new(&config.orbit).with_point_size(config.point_size),
            stats: ViewerStats::default(),
            status: String::with_capacity(STATUS_CAPACITY),
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.selector.mode()
    }

    pub fn buffers(&self) -> &FrameBuffers {
        &self.buffers
    }

    pub fn stats(&self) -> ViewerStats {
        self.stats
    }

    /// Poll the sensor once and decode the bundle, if any
    pub fn tick(&mut self) -> DecodeReport {
        let report = match self.session.reader.acquire_latest_frame() {
            Some(bundle) => self
                .decoder
                .decode(&bundle, &self.session.mapper, &mut self.buffers),
            None => DecodeReport::default(),
        };
        self.stats.record(&report);
        report
    }

    /// Draw the current mode; a failed draw is logged and skipped
    pub fn render<B>(&mut self, backend: &mut B)
    where
        B: RenderBackend + ?Sized,
    {
        let mode = self.selector.mode();
        match self.renderer.render(mode, &self.buffers, backend) {
            Ok(()) => self.stats.rendered_frames += 1,
            Err(e) => {
                self.stats.render_errors += 1;
                warn!(error = %e, %mode, "Render failed");
            }
        }
    }

    /// Apply one input event; returns true when the viewer should exit
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::Key(key) => match self.selector.handle_key(key) {
                ModeCommand::Exit => {
                    info!("Exit requested");
                    true
                }
                ModeCommand::Switched(_) | ModeCommand::None => false,
            },
            InputEvent::CloseRequested => {
                info!("Display closed");
                true
            }
            InputEvent::Resized { width, height } => {
                debug!(width, height, "Display resized");
                false
            }
        }
    }

    /// One-line status shown under the image
    ///
    /// Rebuilt in place each call; the buffer is reused across ticks.
    pub fn status_line(&mut self) -> &str {
        let mode = self.selector.mode();
        let status = &mut self.status;
        status.clear();
        for candidate in DisplayMode::ALL {
            // Writing into a String cannot fail
            let _ = if candidate == mode {
                write!(status, "[{}] {}  ", candidate.key(), candidate)
            } else {
                write!(status, "{} {}  ", candidate.key(), candidate)
            };
        }

        match self.buffers.reliable_range {
            Some((min, max)) => {
                let _ = write!(status, "| {}-{} mm ", min, max);
            }
            None => status.push_str("| waiting for depth "),
        }
        if mode == DisplayMode::Skeleton && !self.buffers.skeleton.tracked {
            status.push_str("| no body tracked ");
        }
        status.push_str("| q quit");
        status
    }

    /// Run until the display closes or the user exits
    ///
    /// Draw failures are tolerated; a failure to present or read input ends
    /// the loop with an error.
    pub fn run<D>(&mut self, display: &mut D, poll_interval: Duration) -> AppResult<()>
    where
        D: DisplaySurface + RenderBackend,
    {
        info!(mode = %self.mode(), "Viewer running");

        while !display.should_close() {
            self.tick();
            self.render(display);
            display.present(self.status_line())?;

            // Wait for input once, then drain whatever else is queued
            let mut timeout = poll_interval;
            while let Some(event) = display.poll_event(timeout)? {
                timeout = Duration::ZERO;
                if self.handle_input(event) {
                    return Ok(());
                }
            }
        }

        info!(ticks = self.stats.ticks, "Display closed, stopping");
        Ok(())
    }
}
