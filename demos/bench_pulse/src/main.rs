// Copyright 2026 the Halo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Headless frame loop over two instances of the same bench model.
//!
//! The first bench shows a blue outline and a red overlay, toggled off and on
//! every [`TOGGLE_EVERY`] frames. The second bench sits two units behind it
//! with both effects always mounted. Overlay opacity pulses each frame, the
//! second bench showing the complement of the first.
//!
//! Events are recorded to an [`EventLog`], summarized on stdout, and written
//! as a Chrome trace to the path given as the first argument (default
//! `halo_trace.json`).

use std::fs::File;
use std::io::BufWriter;
use std::task::Poll;

use halo_core::color::Color;
use halo_core::instance::{AssetInstance, AssetInstanceProps};
use halo_core::trace::Tracer;
use halo_core::transform::Placement;
use halo_debug::log::EventLog;
use halo_effects::{OutlineConfig, OverlayConfig, OverlayEffect, SelectionOutlineEffect};
use halo_harness::fixtures;
use halo_harness::loader::MemoryLoader;
use halo_harness::stage::Stage;

const BENCH_URL: &str =
    "https://vazxmixjsiawhamofees.supabase.co/storage/v1/object/public/models/bench-2/model.gltf";
const FRAME_COUNT: u64 = 600;
/// Two seconds at 60 Hz.
const TOGGLE_EVERY: u64 = 120;
/// Polls the loader answers pending before the model is available.
const LOAD_LATENCY: u32 = 3;
/// 16.7ms frame interval in microseconds (about 60 Hz).
const FRAME_US: f64 = 16_667.0;

/// Overlay opacity that climbs by 0.01 per frame, and on reaching 1 falls
/// from 0.8 back down to 0, where it restarts at 0.3.
#[derive(Debug)]
struct Pulse {
    value: f32,
    ascending: bool,
}

impl Pulse {
    fn new() -> Self {
        Self {
            value: 0.3,
            ascending: true,
        }
    }

    /// Returns the current opacity and steps to the next frame's.
    fn advance(&mut self) -> f32 {
        let current = self.value;
        self.value = if self.ascending {
            if current >= 1.0 {
                self.ascending = false;
                0.8
            } else {
                current + 0.01
            }
        } else if current <= 0.0 {
            self.ascending = true;
            0.3
        } else {
            current - 0.01
        };
        current
    }
}

#[derive(Debug)]
struct Effects {
    outline: SelectionOutlineEffect,
    overlay: OverlayEffect,
}

#[derive(Debug)]
struct Bench {
    instance: AssetInstance,
    effects: Option<Effects>,
    toggled: bool,
    complement: bool,
}

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "halo_trace.json".to_owned());

    let mut loader = MemoryLoader::new().with_latency(LOAD_LATENCY);
    loader.register(BENCH_URL, fixtures::bench());
    let mut stage = Stage::new(loader);

    let mut benches = [
        Bench {
            instance: stage.mount(None, AssetInstanceProps::new(BENCH_URL)),
            effects: None,
            toggled: true,
            complement: false,
        },
        Bench {
            instance: stage.mount(
                None,
                AssetInstanceProps::new(BENCH_URL).with_placement(Placement::at(0.0, 0.0, -2.0)),
            ),
            effects: None,
            toggled: false,
            complement: true,
        },
    ];

    let outline_color: Color = "#0000FF".parse().expect("valid hex color");
    let overlay_color: Color = "red".parse().expect("valid color name");

    let mut log = EventLog::new();
    {
        let mut tracer = Tracer::new(&mut log);
        let mut pulse = Pulse::new();
        let mut show = true;

        for frame in 0..FRAME_COUNT {
            if frame > 0 && frame % TOGGLE_EVERY == 0 {
                show = !show;
            }
            let opacity = pulse.advance();

            stage.begin_frame();
            for bench in &mut benches {
                match stage.update(&mut bench.instance, &mut tracer) {
                    Poll::Pending => continue,
                    Poll::Ready(Err(e)) => {
                        eprintln!("error: {e}");
                        std::process::exit(1);
                    }
                    Poll::Ready(Ok(())) => {}
                }

                let wanted = show || !bench.toggled;
                match (bench.effects.take(), wanted) {
                    (None, true) => {
                        let scope = bench.instance.scope();
                        bench.effects = Some(Effects {
                            outline: SelectionOutlineEffect::mount(
                                &stage.scopes,
                                scope,
                                OutlineConfig::default().with_edge_color(outline_color),
                            ),
                            overlay: OverlayEffect::mount(
                                &stage.scopes,
                                scope,
                                OverlayConfig::new(overlay_color),
                            ),
                        });
                    }
                    (Some(effects), false) => {
                        effects.overlay.unmount(&mut stage.scene, &mut tracer);
                    }
                    (effects, _) => bench.effects = effects,
                }

                if let Some(effects) = &mut bench.effects {
                    let opacity = if bench.complement {
                        1.0 - opacity
                    } else {
                        opacity
                    };
                    effects.overlay.set_opacity(opacity);
                    let _ = effects
                        .overlay
                        .sync(&mut stage.scene, &stage.scopes, &mut tracer);
                    let _ = effects
                        .outline
                        .render(&stage.scopes, &mut stage.plan, &mut tracer);
                }
            }
            stage.end_frame(&mut tracer);
        }

        stage.begin_frame();
        for bench in benches {
            if let Some(effects) = bench.effects {
                effects.overlay.unmount(&mut stage.scene, &mut tracer);
            }
            bench
                .instance
                .unmount(&mut stage.scene, &mut stage.scopes, &mut tracer);
        }
        stage.end_frame(&mut tracer);
    }

    println!("{} frames, {} events", stage.frame(), log.entries().len());
    for name in [
        "InstanceSuspended",
        "InstanceResolved",
        "InstanceReleased",
        "OverlayStructuralSync",
        "OverlayConfigSync",
        "OverlayTeardown",
        "OutlineDeclared",
    ] {
        println!("  {name:<24}{:>6}", log.count(|e| e.name() == name));
    }
    println!(
        "presenter: {} material uploads, {} releases, {} live nodes",
        stage.presenter.material_uploads(),
        stage.presenter.material_releases(),
        stage.presenter.live_nodes(),
    );
    let outlined = stage
        .compositor
        .frames()
        .iter()
        .filter(|f| f.len() == 2)
        .count();
    println!("compositor: both benches outlined in {outlined} frames");

    let file = File::create(&path).expect("failed to create trace file");
    let mut writer = BufWriter::new(file);
    halo_debug::chrome::export(&log, FRAME_US, &mut writer).expect("failed to write Chrome trace");
    println!("Wrote {path}");
}
