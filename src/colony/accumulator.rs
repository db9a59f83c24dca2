/// Running moments of a connected component while it is being flooded.
pub(crate) struct ParticleAccumulator {
    pub indices: Vec<usize>,
    pub sum_x: f64,
    pub sum_y: f64,
    pub sum_xx: f64,
    pub sum_yy: f64,
    pub sum_xy: f64,
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl ParticleAccumulator {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            indices: Vec::with_capacity(capacity),
            sum_x: 0.0,
            sum_y: 0.0,
            sum_xx: 0.0,
            sum_yy: 0.0,
            sum_xy: 0.0,
            min_x: usize::MAX,
            min_y: usize::MAX,
            max_x: 0,
            max_y: 0,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.indices.clear();
        self.sum_x = 0.0;
        self.sum_y = 0.0;
        self.sum_xx = 0.0;
        self.sum_yy = 0.0;
        self.sum_xy = 0.0;
        self.min_x = usize::MAX;
        self.min_y = usize::MAX;
        self.max_x = 0;
        self.max_y = 0;
    }

    pub(crate) fn push(&mut self, idx: usize, x: usize, y: usize) {
        self.indices.push(idx);
        let xf = x as f64;
        let yf = y as f64;
        self.sum_x += xf;
        self.sum_y += yf;
        self.sum_xx += xf * xf;
        self.sum_yy += yf * yf;
        self.sum_xy += xf * yf;
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub(crate) fn len(&self) -> usize {
        self.indices.len()
    }

    /// Centroid, or `None` for an empty accumulator.
    pub(crate) fn centroid(&self) -> Option<(f64, f64)> {
        if self.indices.is_empty() {
            return None;
        }
        let n = self.indices.len() as f64;
        Some((self.sum_x / n, self.sum_y / n))
    }

    /// Central second moments `(cxx, cxy, cyy)`.
    pub(crate) fn covariance(&self) -> Option<(f64, f64, f64)> {
        let (cx, cy) = self.centroid()?;
        let n = self.indices.len() as f64;
        Some((
            self.sum_xx / n - cx * cx,
            self.sum_xy / n - cx * cy,
            self.sum_yy / n - cy * cy,
        ))
    }
}
