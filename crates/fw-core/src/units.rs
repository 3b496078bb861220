// fw-core/src/units.rs

use uom::si::f64::{
    Acceleration as UomAcceleration, Angle as UomAngle, Force as UomForce, Length as UomLength,
    Mass as UomMass, MassDensity as UomMassDensity, Time as UomTime, Velocity as UomVelocity,
};

// Public canonical unit types (SI, f64)
pub type Accel = UomAcceleration;
pub type Angle = UomAngle;
pub type Density = UomMassDensity;
pub type Force = UomForce;
pub type Length = UomLength;
pub type Mass = UomMass;
pub type Time = UomTime;
pub type Velocity = UomVelocity;

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn kgpm3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn rad(v: f64) -> Angle {
    use uom::si::angle::radian;
    Angle::new::<radian>(v)
}

#[inline]
pub fn deg(v: f64) -> Angle {
    use uom::si::angle::degree;
    Angle::new::<degree>(v)
}

#[inline]
pub fn newton(v: f64) -> Force {
    use uom::si::force::newton;
    Force::new::<newton>(v)
}

#[inline]
pub fn kg(v: f64) -> Mass {
    use uom::si::mass::kilogram;
    Mass::new::<kilogram>(v)
}

pub mod constants {
    use super::*;

    pub const G0_MPS2: f64 = 9.806_65;

    #[inline]
    pub fn g0() -> Accel {
        use uom::si::acceleration::meter_per_second_squared;
        Accel::new::<meter_per_second_squared>(G0_MPS2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _u = mps(20.0);
        let _rho = kgpm3(1.225);
        let _l = m(2.0);
        let _dt = s(0.05);
        let _f = newton(10.0);
        let _m = kg(0.75);
        let _g0 = constants::g0();
    }

    #[test]
    fn degrees_convert_to_radians() {
        let a = deg(180.0);
        assert!((a.value - std::f64::consts::PI).abs() < 1e-12);
        assert_eq!(rad(0.5).value, 0.5);
    }
}
