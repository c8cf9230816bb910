// 基础结构定义。摆锤位置等二维量统一用 Vector2D 表示

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    // 极坐标 -> 直角坐标。角度从竖直向下方向量起，y 轴向下
    pub fn from_polar(length: f64, angle: f64) -> Self {
        Self {
            x: length * angle.sin(),
            y: length * angle.cos(),
        }
    }

    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Vector2D {
    type Output = Self;
    fn add(self, other: Self) -> Self::Output {
        Self { x: self.x + other.x, y: self.y + other.y }
    }
}
impl std::ops::Sub for Vector2D {
    type Output = Self;
    fn sub(self, other: Self) -> Self::Output {
        Self { x: self.x - other.x, y: self.y - other.y }
    }
}
impl std::ops::Mul<f64> for Vector2D {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Self { x: self.x * rhs, y: self.y * rhs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polar_points_down_at_zero_angle() {
        let v = Vector2D::from_polar(2.0, 0.0);
        assert_eq!(v, Vector2D::new(0.0, 2.0));
    }

    #[test]
    fn length_of_3_4() {
        let v = Vector2D::new(3.0, 4.0) - Vector2D::new(0.0, 0.0);
        assert_eq!(v.length(), 5.0);
        assert_eq!((v * 2.0).length_squared(), 100.0);
    }
}
