use laserkit_core::error::JobError;
use laserkit_core::job::{Job, JobPart, LaserProperty, RasterPart, VectorPart};
use laserkit_core::validate::check_job;

fn vector_job(commands: impl FnOnce(&mut VectorPart)) -> Job {
    let mut part = VectorPart::new(254.0); // 10 dots per mm
    commands(&mut part);
    let mut job = Job::new("test");
    job.add_part(JobPart::Vector(part));
    job
}

#[test]
fn job_inside_bed_passes() {
    let job = vector_job(|p| {
        p.move_to(0, 0);
        p.line_to(1000, 2000); // 100 x 200 mm
    });
    assert!(check_job(&job, 300.0, 300.0).is_ok());
}

#[test]
fn coordinate_beyond_bed_fails() {
    let job = vector_job(|p| {
        p.move_to(0, 0);
        p.line_to(4000, 0); // 400 mm on a 300 mm bed
    });
    let err = check_job(&job, 300.0, 300.0).unwrap_err();
    match err {
        JobError::OutOfBounds { part, command, .. } => {
            assert_eq!(part, 0);
            assert_eq!(command, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn negative_coordinate_fails() {
    let job = vector_job(|p| p.move_to(-10, 0));
    assert!(matches!(
        check_job(&job, 300.0, 300.0),
        Err(JobError::OutOfBounds { .. })
    ));
}

#[test]
fn empty_job_fails() {
    let job = Job::new("empty");
    assert!(matches!(
        check_job(&job, 300.0, 300.0),
        Err(JobError::Empty { .. })
    ));
}

#[test]
fn zero_resolution_fails() {
    let mut job = Job::new("bad-dpi");
    job.add_part(JobPart::Vector(VectorPart::new(0.0)));
    assert!(matches!(
        check_job(&job, 300.0, 300.0),
        Err(JobError::InvalidResolution { part: 0, .. })
    ));
}

#[test]
fn raster_checked_by_bounding_box() {
    let mut job = Job::new("raster");
    // 10 dots/mm; origin 2950 dots = 295 mm, width 100 dots = +10 mm -> over
    job.add_part(JobPart::Raster(RasterPart::new(
        254.0,
        (2950, 0),
        100,
        10,
        LaserProperty::default(),
    )));
    assert!(matches!(
        check_job(&job, 300.0, 300.0),
        Err(JobError::OutOfBounds { .. })
    ));
}
