// 定义一个特征，代表任何可以进行线性代数运算的状态类型
pub trait VectorSpace: Sized + Clone {
    // 向量加法: self + other
    fn add(&self, other: &Self) -> Self;

    // 标量乘法: self * scalar
    fn scale(&self, scalar: f64) -> Self;
}

// T 代表状态类型，它必须满足 VectorSpace 特征
pub trait OdeSystem<T: VectorSpace> {
    // 计算导数: f(t, y) -> dy/dt
    fn derivatives(&self, t: f64, y: &T) -> T;
}

/// 经典四阶龙格-库塔单步，返回 y(t + h)
///
/// 组合顺序固定为 `k1 + 2*k2 + 2*k3 + k4`，保证同一输入逐位可复现。
pub fn rk4_step<T, S>(system: &S, t: f64, y: &T, h: f64) -> T
where
    T: VectorSpace,
    S: OdeSystem<T> + ?Sized,
{
    // k1 = f(t, y)
    let k1 = system.derivatives(t, y);

    // k2 = f(t + h/2, y + k1 * h/2)
    let k2_state = y.add(&k1.scale(0.5 * h));
    let k2 = system.derivatives(t + 0.5 * h, &k2_state);

    // k3 = f(t + h/2, y + k2 * h/2)
    let k3_state = y.add(&k2.scale(0.5 * h));
    let k3 = system.derivatives(t + 0.5 * h, &k3_state);

    // k4 = f(t + h, y + k3 * h)
    let k4_state = y.add(&k3.scale(h));
    let k4 = system.derivatives(t + h, &k4_state);

    // y_{n+1} = y + (h/6) * (k1 + 2*k2 + 2*k3 + k4)
    let delta = k1
        .add(&k2.scale(2.0))
        .add(&k3.scale(2.0))
        .add(&k4)
        .scale(h / 6.0);

    y.add(&delta)
}

pub struct RungeKuttaSolver<T> {
    pub t: f64,
    pub state: T,
}

impl<T: VectorSpace> RungeKuttaSolver<T> {
    pub fn new(t0: f64, y0: T) -> Self {
        Self { t: t0, state: y0 }
    }

    // S 是实现了 OdeSystem<T> 的物理系统
    pub fn step<S: OdeSystem<T>>(&mut self, system: &S, dt: f64) {
        self.state = rk4_step(system, self.t, &self.state, dt);
        self.t += dt;
    }
}
