//! Weighted superposition of orbital contributions into a [`Datacube`].
//!
//! A build is a map-reduce over the sweep grid:
//!
//! 1. **map** - for every (enabled contribution, grid point) pair whose map
//!    is not cached, call the kernel once. Pairs run in parallel on rayon.
//! 2. **reduce** - for every grid point, sum `weight × map` over the enabled
//!    contributions. Each point's slice is produced by exactly one closure;
//!    the slices are stacked afterwards.
//!
//! Any kernel failure, wrong map shape or non-finite pixel rejects the
//! whole build. Unoriented maps are cached per (orbital, orientation,
//! grid point), so a rebuild after a weight or enable change only redoes
//! the reduce step.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use ndarray::{Array2, ArrayView2, Axis};
use rayon::prelude::*;

use crate::error::EngineError;
use crate::models::{Contribution, OrbitalId};

use super::axis::{SweepGrid, SweepPoint};
use super::datacube::Datacube;
use super::kernel::OrbitalKernel;

/// (orbital, orientation bits, flat grid index)
type MapKey = (OrbitalId, [u64; 3], usize);

type MapStore = HashMap<MapKey, Arc<Array2<f64>>>;

#[derive(Debug)]
pub struct DatacubeBuilder {
    grid: SweepGrid,
    parameters: BTreeMap<String, f64>,
    cache_enabled: bool,
    cache: MapStore,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl DatacubeBuilder {
    /// Builder over `grid`, passing `parameters` to the kernel at every
    /// point underneath the swept values.
    pub fn new(grid: SweepGrid, parameters: BTreeMap<String, f64>) -> Self {
        Self {
            grid,
            parameters,
            cache_enabled: true,
            cache: HashMap::new(),
            pool: None,
        }
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        if !enabled {
            self.cache.clear();
        }
        self
    }

    /// Run builds on a dedicated pool of `threads` workers; `0` keeps the
    /// global rayon pool.
    pub fn with_threads(mut self, threads: usize) -> Result<Self, EngineError> {
        self.pool = if threads == 0 {
            None
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| EngineError::Io(format!("cannot start build pool: {e}")))?;
            Some(Arc::new(pool))
        };
        Ok(self)
    }

    pub fn grid(&self) -> &SweepGrid {
        &self.grid
    }

    pub fn parameters(&self) -> &BTreeMap<String, f64> {
        &self.parameters
    }

    /// Replace the sweep grid. Cached maps are dropped.
    pub fn set_grid(&mut self, grid: SweepGrid) {
        self.grid = grid;
        self.cache.clear();
    }

    /// Replace the fixed kernel parameters. Cached maps are dropped.
    pub fn set_parameters(&mut self, parameters: BTreeMap<String, f64>) {
        self.parameters = parameters;
        self.cache.clear();
    }

    /// Drop every cached map, e.g. after swapping the kernel.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cached_maps(&self) -> usize {
        self.cache.len()
    }

    /// Superpose the enabled entries of `contributions` over the grid.
    ///
    /// Pass the whole ledger, disabled entries included: cached maps are
    /// kept for every entry in `contributions` and dropped for the rest.
    pub fn build<K>(&mut self, contributions: &[Contribution], kernel: &K) -> Result<Datacube, EngineError>
    where
        K: OrbitalKernel + ?Sized,
    {
        match self.pool.clone() {
            Some(pool) => pool.install(|| self.build_inner(contributions, kernel)),
            None => self.build_inner(contributions, kernel),
        }
    }

    fn build_inner<K>(&mut self, contributions: &[Contribution], kernel: &K) -> Result<Datacube, EngineError>
    where
        K: OrbitalKernel + ?Sized,
    {
        let started = Instant::now();
        let enabled: Vec<&Contribution> = contributions.iter().filter(|c| c.enabled).collect();
        let points = self.grid.points(&self.parameters);
        let shape = kernel.map_shape();

        // map
        let jobs: Vec<(&Contribution, &SweepPoint)> = points
            .iter()
            .flat_map(|point| enabled.iter().map(move |c| (*c, point)))
            .filter(|(c, point)| !self.cache.contains_key(&map_key(c, point.index)))
            .collect();
        let fresh: MapStore = jobs
            .par_iter()
            .map(|(c, point)| {
                let map = compute_map(kernel, c, point, shape)?;
                Ok((map_key(c, point.index), Arc::new(map)))
            })
            .collect::<Result<_, EngineError>>()?;

        // reduce
        let cache = &self.cache;
        let slices: Vec<Array2<f64>> = points
            .par_iter()
            .map(|point| {
                let mut acc = Array2::<f64>::zeros(shape);
                for c in &enabled {
                    let key = map_key(c, point.index);
                    let map = fresh.get(&key).or_else(|| cache.get(&key)).ok_or_else(|| {
                        EngineError::NotFound(format!(
                            "no map for orbital {} at sweep point {}",
                            c.orbital, point.index
                        ))
                    })?;
                    acc.scaled_add(c.weight, &**map);
                }
                Ok(acc)
            })
            .collect::<Result<_, EngineError>>()?;

        let views: Vec<ArrayView2<'_, f64>> = slices.iter().map(Array2::view).collect();
        let data = ndarray::stack(Axis(0), &views)
            .map_err(|e| EngineError::InvalidValue(format!("cannot assemble cube: {e}")))?;

        let computed = fresh.len();
        if self.cache_enabled {
            self.cache.extend(fresh);
            // Disabled entries keep their maps so re-enabling is free.
            let live: HashSet<(OrbitalId, [u64; 3])> = contributions
                .iter()
                .map(|c| (c.orbital.clone(), c.orientation.cache_key()))
                .collect();
            self.cache
                .retain(|(orbital, orientation, _), _| live.contains(&(orbital.clone(), *orientation)));
        }

        tracing::info!(
            points = points.len(),
            contributions = enabled.len(),
            kernel_calls = computed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "datacube built"
        );
        Datacube::new(self.grid.clone(), data)
    }
}

/// Build a cube without keeping any cache around.
pub fn build_datacube<K>(
    grid: &SweepGrid,
    parameters: &BTreeMap<String, f64>,
    contributions: &[Contribution],
    kernel: &K,
) -> Result<Datacube, EngineError>
where
    K: OrbitalKernel + ?Sized,
{
    DatacubeBuilder::new(grid.clone(), parameters.clone())
        .with_cache(false)
        .build(contributions, kernel)
}

fn map_key(contribution: &Contribution, point: usize) -> MapKey {
    (
        contribution.orbital.clone(),
        contribution.orientation.cache_key(),
        point,
    )
}

fn compute_map<K>(
    kernel: &K,
    contribution: &Contribution,
    point: &SweepPoint,
    shape: (usize, usize),
) -> Result<Array2<f64>, EngineError>
where
    K: OrbitalKernel + ?Sized,
{
    let failure = |message: String| {
        tracing::warn!(
            orbital = %contribution.orbital,
            point = point.index,
            reason = message.as_str(),
            "kernel output rejected"
        );
        EngineError::KernelFailure {
            orbital: contribution.orbital.clone(),
            point: point.index,
            message,
        }
    };

    let map = kernel
        .compute_orbital_slice(&contribution.orbital, &contribution.orientation, point)
        .map_err(|e| failure(e.to_string()))?;

    if map.dim() != shape {
        return Err(failure(format!(
            "map shape {:?} does not match kernel shape {:?}",
            map.dim(),
            shape
        )));
    }
    if let Some(((row, column), value)) = map.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(failure(format!(
            "non-finite value {value} at pixel ({row}, {column})"
        )));
    }
    Ok(map)
}
