use campose::config::Config;
use campose::interpolate::qslerp;
use campose::{CameraPose, Quaternion, Vec3};

fn main() {
    env_logger::init();

    let config = match Config::new(std::env::args().skip(1).collect()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    println!("{config}");

    let mut start = CameraPose::new(config.from, Quaternion::IDENTITY);
    start.set_key_frame(true);

    let mut end = start;
    end.position_mut().set_xyz(config.to);
    end.rotate(config.angle, config.axis.x, config.axis.y, config.axis.z);
    end.sync_basis_from_orientation();

    log::info!(
        "keyframes are {:.4} apart, sampling {} poses",
        start.distance_to(&end),
        config.steps,
    );

    let q1: [f64; 4] = start.orientation.into();
    let q2: [f64; 4] = end.orientation.into();
    let mut previous = start;

    for i in 0..config.steps {
        let t = i as f64 / (config.steps - 1) as f64;

        let mut q = [0.0; 4];
        qslerp(&q1, &q2, &mut q, t);
        let position = interpolate_position(config.from, config.to, t);

        let mut pose = CameraPose::new(position, q.into());
        pose.set_key_frame(i == 0 || i + 1 == config.steps);

        println!(
            "t {t:.3}  {}  position {position}  orientation {}  step {:.4}",
            if pose.is_key_frame() { "key" } else { "   " },
            pose.orientation,
            pose.distance_to(&previous),
        );
        log::debug!("ahead axis {}", pose.ahead_axis());
        previous = pose;
    }
}

fn interpolate_position(from: Vec3, to: Vec3, t: f64) -> Vec3 {
    from + (to - from) * t
}
