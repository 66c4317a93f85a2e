//! GPU backend: data-parallel physics for 10⁵–10⁶ objects
//!
//! Object state lives in a single storage buffer of `GpuObject` slots
//! (`status == 0` marks a free slot, so the zero-initialized buffer needs
//! no seeding pass). Each tick dispatches three compute passes — integrate,
//! grid occupancy, collision counting — then copies the object buffer and
//! counters to staging and maps them asynchronously. The read-back is
//! single-buffered: `step` refuses to run while a map is in flight, and
//! `snapshot` is the await point that resolves it.
//!
//! Because counters are only available after the read-back resolves, the
//! count fields of a tick report describe the *previous* tick.

use bytemuck::Zeroable;
use glam::DVec3;

use orbit_physics::{
    altitude_km, ForceConfig, GpuObject, IntegratorConfig, ObjectClass, ObjectId, STATUS_FREE,
};

use crate::engine::{
    Backend, CoreStats, EngineConfig, FrameSnapshot, ObjectSample, SnapshotEntry, TickReport,
};
use crate::error::EngineError;
use crate::params::{SimParams, GRID_BUCKETS};
use crate::store::ObjectSeed;

const OBJECT_STRIDE: u64 = std::mem::size_of::<GpuObject>() as u64;
const COUNTER_BUFFER_SIZE: u64 = 16;

/// Resolved per-tick counters, in read-back order.
#[derive(Clone, Copy, Debug, Default)]
struct TickCounters {
    alive: u32,
    burned: u32,
    candidates: u32,
    debris_estimate: u32,
}

pub(crate) struct GpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,

    // Buffers
    object_buffer: wgpu::Buffer,
    params_buffer: wgpu::Buffer,
    counter_buffer: wgpu::Buffer,
    grid_buffer: wgpu::Buffer,
    staging_objects: wgpu::Buffer,
    staging_counters: wgpu::Buffer,

    // Compute pipelines
    integrate_pipeline: wgpu::ComputePipeline,
    grid_pipeline: wgpu::ComputePipeline,
    collide_pipeline: wgpu::ComputePipeline,

    // Bind groups
    integrate_bind_group: wgpu::BindGroup,
    collision_bind_group: wgpu::BindGroup,

    capacity: u32,
    forces: ForceConfig,
    integrator: IntegratorConfig,
    sim_time: f64,
    next_id: u32,

    /// CPU mirror of the object buffer, refreshed by each read-back
    mirror: Vec<GpuObject>,
    /// A map is in flight; `step` must wait for `snapshot`
    pending: bool,
    last_counters: TickCounters,
}

impl GpuBackend {
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        log::info!("Initializing GPU backend...");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| EngineError::Initialization(format!("no compute adapter: {e}")))?;

        log::info!("✓ Using GPU: {}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Orbit Simulation Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: wgpu::MemoryHints::default(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| EngineError::Initialization(format!("device request failed: {e}")))?;

        let capacity = config.capacity as u32;
        let object_buffer_size = OBJECT_STRIDE * capacity as u64;

        // Zero-initialized by wgpu: every slot starts as STATUS_FREE.
        let object_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Object Buffer"),
            size: object_buffer_size,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sim Params Buffer"),
            size: std::mem::size_of::<SimParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Counter layout (16 bytes, 4x u32):
        // [0] alive after integration
        // [1] burned this tick
        // [2] collision candidates (each side of a pair counts once)
        // [3] debris yield estimate (also double-counted per pair)
        let counter_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Counter Buffer"),
            size: COUNTER_BUFFER_SIZE,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let grid_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Spatial Grid Buffer"),
            size: GRID_BUCKETS as u64 * 4,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let staging_objects = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Object Staging Buffer"),
            size: object_buffer_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let staging_counters = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Counter Staging Buffer"),
            size: COUNTER_BUFFER_SIZE,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        log::info!("Buffers created");

        // Load compute shaders
        let integrate_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Integrate Compute Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/integrate.wgsl").into()),
        });

        let grid_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Grid Occupancy Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/grid.wgsl").into()),
        });

        let collide_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Collision Count Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/collide.wgsl").into()),
        });

        log::info!("Shaders loaded");

        // Integration: objects (rw), params, counters (rw)
        let integrate_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Integrate Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: false },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: false },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });

        // Broad phase + collision counting: objects (read), params,
        // grid (rw atomics), counters (rw atomics)
        let collision_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Collision Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: true },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: false },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Storage { read_only: false },
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });

        let integrate_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Integrate Pipeline Layout"),
                bind_group_layouts: &[&integrate_bind_group_layout],
                push_constant_ranges: &[],
            });

        let collision_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Collision Pipeline Layout"),
                bind_group_layouts: &[&collision_bind_group_layout],
                push_constant_ranges: &[],
            });

        let integrate_pipeline =
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("Integrate Pipeline"),
                layout: Some(&integrate_pipeline_layout),
                module: &integrate_shader,
                entry_point: Some("integrate"),
                compilation_options: Default::default(),
                cache: None,
            });

        let grid_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Grid Occupancy Pipeline"),
            layout: Some(&collision_pipeline_layout),
            module: &grid_shader,
            entry_point: Some("count_cells"),
            compilation_options: Default::default(),
            cache: None,
        });

        let collide_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Collision Count Pipeline"),
            layout: Some(&collision_pipeline_layout),
            module: &collide_shader,
            entry_point: Some("count_candidates"),
            compilation_options: Default::default(),
            cache: None,
        });

        let integrate_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Integrate Bind Group"),
            layout: &integrate_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: object_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: counter_buffer.as_entire_binding(),
                },
            ],
        });

        let collision_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Collision Bind Group"),
            layout: &collision_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: object_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: grid_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: counter_buffer.as_entire_binding(),
                },
            ],
        });

        log::info!("Bind groups created");

        Ok(Self {
            device,
            queue,
            object_buffer,
            params_buffer,
            counter_buffer,
            grid_buffer,
            staging_objects,
            staging_counters,
            integrate_pipeline,
            grid_pipeline,
            collide_pipeline,
            integrate_bind_group,
            collision_bind_group,
            capacity,
            forces: config.forces,
            integrator: config.integrator,
            sim_time: 0.0,
            next_id: 0,
            mirror: vec![GpuObject::zeroed(); config.capacity],
            pending: false,
            last_counters: TickCounters::default(),
        })
    }

    fn sample(slot: &GpuObject) -> Option<ObjectSample> {
        let class = slot.class()?;
        let position = DVec3::new(
            slot.position[0] as f64,
            slot.position[1] as f64,
            slot.position[2] as f64,
        );
        Some(ObjectSample {
            id: ObjectId(slot.id),
            position,
            velocity: DVec3::new(
                slot.velocity[0] as f64,
                slot.velocity[1] as f64,
                slot.velocity[2] as f64,
            ),
            altitude_km: altitude_km(position),
            class,
        })
    }

    /// Resolve the in-flight read-back, refreshing the mirror and the
    /// per-tick counters.
    fn resolve_readback(&mut self) -> Result<(), EngineError> {
        if !self.pending {
            return Ok(());
        }
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: None,
            })
            .map_err(|e| EngineError::DeviceLost(e.to_string()))?;

        {
            let data = self.staging_objects.slice(..).get_mapped_range();
            self.mirror.clear();
            self.mirror
                .extend_from_slice(bytemuck::cast_slice::<u8, GpuObject>(&data));
        }
        self.staging_objects.unmap();

        {
            let data = self.staging_counters.slice(..).get_mapped_range();
            let counters: &[u32] = bytemuck::cast_slice(&data);
            self.last_counters = TickCounters {
                alive: counters[0],
                burned: counters[1],
                candidates: counters[2],
                debris_estimate: counters[3],
            };
        }
        self.staging_counters.unmap();

        log::debug!(
            "read-back: {} alive, {} burned, {} candidates",
            self.last_counters.alive,
            self.last_counters.burned,
            self.last_counters.candidates
        );
        self.pending = false;
        Ok(())
    }
}

impl Backend for GpuBackend {
    fn seed(&mut self, seeds: Vec<ObjectSeed>) -> Vec<ObjectId> {
        let mut ids = Vec::with_capacity(seeds.len());
        let mut iter = seeds.into_iter();
        for slot in self.mirror.iter_mut() {
            if slot.status != STATUS_FREE {
                continue;
            }
            let Some(seed) = iter.next() else {
                break;
            };
            let id = ObjectId(self.next_id);
            self.next_id += 1;
            *slot = GpuObject::from_object(&orbit_physics::SpaceObject {
                id,
                position: seed.position,
                velocity: seed.velocity,
                mass: seed.mass,
                radius: seed.radius,
                class: seed.class,
                orbit: seed.orbit,
                created_at: self.sim_time,
            });
            ids.push(id);
        }
        self.queue
            .write_buffer(&self.object_buffer, 0, bytemuck::cast_slice(&self.mirror));
        ids
    }

    fn step(&mut self, dt: f64) -> Result<TickReport, EngineError> {
        if self.pending {
            return Err(EngineError::ReadbackInFlight);
        }

        let plan = self.integrator.plan(dt);
        let params = SimParams::for_tick(plan, self.sim_time, self.capacity, &self.forces);
        self.queue
            .write_buffer(&self.params_buffer, 0, bytemuck::cast_slice(&[params]));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Tick Encoder"),
            });

        encoder.clear_buffer(&self.counter_buffer, 0, None);
        encoder.clear_buffer(&self.grid_buffer, 0, None);

        // 256 threads per workgroup
        let workgroup_count = (self.capacity + 255) / 256;

        // Pass 1: sub-stepped integration + lifecycle
        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Integrate Pass"),
                timestamp_writes: None,
            });
            compute_pass.set_pipeline(&self.integrate_pipeline);
            compute_pass.set_bind_group(0, &self.integrate_bind_group, &[]);
            compute_pass.dispatch_workgroups(workgroup_count, 1, 1);
        }

        // Pass 2: spatial grid occupancy
        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Grid Occupancy Pass"),
                timestamp_writes: None,
            });
            compute_pass.set_pipeline(&self.grid_pipeline);
            compute_pass.set_bind_group(0, &self.collision_bind_group, &[]);
            compute_pass.dispatch_workgroups(workgroup_count, 1, 1);
        }

        // Pass 3: collision candidate counting
        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Collision Count Pass"),
                timestamp_writes: None,
            });
            compute_pass.set_pipeline(&self.collide_pipeline);
            compute_pass.set_bind_group(0, &self.collision_bind_group, &[]);
            compute_pass.dispatch_workgroups(workgroup_count, 1, 1);
        }

        encoder.copy_buffer_to_buffer(
            &self.object_buffer,
            0,
            &self.staging_objects,
            0,
            OBJECT_STRIDE * self.capacity as u64,
        );
        encoder.copy_buffer_to_buffer(
            &self.counter_buffer,
            0,
            &self.staging_counters,
            0,
            COUNTER_BUFFER_SIZE,
        );

        self.queue.submit(std::iter::once(encoder.finish()));

        self.staging_objects
            .slice(..)
            .map_async(wgpu::MapMode::Read, |_| {});
        self.staging_counters
            .slice(..)
            .map_async(wgpu::MapMode::Read, |_| {});
        self.pending = true;

        self.sim_time += plan.count as f64 * plan.step;

        // Candidates and yields count both sides of a pair; counters
        // describe the previous tick (see module docs).
        Ok(TickReport {
            sim_time: self.sim_time,
            sub_steps: plan.count,
            collisions: Vec::new(),
            removals: Vec::new(),
            collision_count: self.last_counters.candidates / 2,
            removed_count: self.last_counters.burned,
            debris_created: self.last_counters.debris_estimate / 2,
            debris_truncated: 0,
        })
    }

    fn snapshot(&mut self) -> Result<FrameSnapshot, EngineError> {
        self.resolve_readback()?;
        Ok(FrameSnapshot {
            sim_time: self.sim_time,
            objects: self
                .mirror
                .iter()
                .filter_map(|slot| {
                    let class = slot.class()?;
                    Some(SnapshotEntry {
                        id: ObjectId(slot.id),
                        position: DVec3::new(
                            slot.position[0] as f64,
                            slot.position[1] as f64,
                            slot.position[2] as f64,
                        ),
                        class,
                    })
                })
                .collect(),
        })
    }

    fn object(&self, id: ObjectId) -> Option<ObjectSample> {
        self.mirror
            .iter()
            .find(|slot| slot.is_alive() && slot.id == id.0)
            .and_then(Self::sample)
    }

    fn live_satellites(&self) -> Vec<ObjectSample> {
        self.mirror
            .iter()
            .filter(|slot| slot.class() == Some(ObjectClass::Satellite))
            .filter_map(Self::sample)
            .collect()
    }

    fn set_object_state(&mut self, id: ObjectId, position: DVec3, velocity: DVec3) -> bool {
        let Some(index) = self
            .mirror
            .iter()
            .position(|slot| slot.is_alive() && slot.id == id.0)
        else {
            return false;
        };
        self.mirror[index].position = position.as_vec3().to_array();
        self.mirror[index].velocity = velocity.as_vec3().to_array();
        self.queue.write_buffer(
            &self.object_buffer,
            index as u64 * OBJECT_STRIDE,
            bytemuck::bytes_of(&self.mirror[index]),
        );
        true
    }

    fn core_stats(&self) -> CoreStats {
        let mut stats = CoreStats::default();
        let mut altitude_sum = 0.0;
        for slot in &self.mirror {
            match slot.class() {
                Some(ObjectClass::Satellite) => stats.satellites += 1,
                Some(ObjectClass::Debris) => stats.debris += 1,
                None => continue,
            }
            stats.active += 1;
            let position = DVec3::new(
                slot.position[0] as f64,
                slot.position[1] as f64,
                slot.position[2] as f64,
            );
            altitude_sum += altitude_km(position);
        }
        if stats.active > 0 {
            stats.average_altitude_km = altitude_sum / stats.active as f64;
        }
        stats
    }

    fn sim_time(&self) -> f64 {
        self.sim_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbit_physics::STATUS_BURNED;

    #[test]
    fn counter_layout_matches_shader_struct() {
        // alive, burned, candidates, debris_estimate — 4 u32s
        assert_eq!(COUNTER_BUFFER_SIZE, 16);
    }

    #[test]
    fn object_stride_matches_wgsl() {
        assert_eq!(OBJECT_STRIDE, 48);
    }

    #[test]
    fn burned_status_is_not_alive() {
        let mut slot = GpuObject::zeroed();
        slot.status = STATUS_BURNED;
        assert!(!slot.is_alive());
        assert!(slot.class().is_none());
    }
}
