use std::fs;
use std::path::Path;

use crate::error::{PlannerError, Result};
use crate::geometry::{Pose, RealVectorState};
use crate::obstacles::StaticSphericalObstacle;
use crate::vehicle::Vehicle;
use crate::workspace::GoalRegion;
use log::{debug, warn};
use num_traits::Float;

/// Reads `x, y, [z,] radius` obstacle records after a header line.
pub fn read_obstacles<F: Float, const N: usize>(
    path: &Path,
) -> Result<Vec<StaticSphericalObstacle<F, N>>> {
    let mut obstacles = Vec::new();
    for (line, fields) in records(path)? {
        let values = parse_fields::<F>(path, line, &fields, N + 1, N + 1)?;
        let center = position_from(&values);
        obstacles.push(StaticSphericalObstacle::new(center, values[N]));
    }
    debug!("Read {} obstacles from {}", obstacles.len(), path.display());
    Ok(obstacles)
}

/// Reads `x, y` vehicle outline offsets after a header line.
pub fn read_vehicle<F: Float, const N: usize>(path: &Path) -> Result<Vehicle<F, N>> {
    let mut offsets = Vec::new();
    for (line, fields) in records(path)? {
        let values = parse_fields::<F>(path, line, &fields, 2, 2)?;
        offsets.push([values[0], values[1]]);
    }
    debug!("Read {} vehicle points from {}", offsets.len(), path.display());
    Ok(Vehicle::new(offsets))
}

/// Reads the start record `x, y, [z,] theta` and the goal record `x, y, [z,] theta[, radius]`.
///
/// Parameters:
/// - `path`: The states file.
/// - `goal_radius`: Radius used when the goal record carries none.
pub fn read_states<F: Float, const N: usize>(
    path: &Path,
    goal_radius: F,
) -> Result<(Pose<F, N>, GoalRegion<F, N>)> {
    let mut lines = records(path)?.into_iter();
    let (start_line, start_fields) = lines.next().ok_or_else(|| PlannerError::MissingRecord {
        path: path.to_path_buf(),
        what: "start",
    })?;
    let (goal_line, goal_fields) = lines.next().ok_or_else(|| PlannerError::MissingRecord {
        path: path.to_path_buf(),
        what: "goal",
    })?;

    let start = parse_fields::<F>(path, start_line, &start_fields, N + 1, N + 1)?;
    let goal = parse_fields::<F>(path, goal_line, &goal_fields, N + 1, N + 2)?;
    let radius = goal.get(N + 1).copied().unwrap_or(goal_radius);
    if !(radius > F::zero()) {
        return Err(PlannerError::parse(
            path,
            goal_line,
            "goal radius must be positive",
        ));
    }

    Ok((
        Pose::new(position_from(&start), start[N]),
        GoalRegion::new(Pose::new(position_from(&goal), goal[N]), radius),
    ))
}

/// Like [`read_obstacles`], but a missing file yields no obstacles.
pub fn read_obstacles_or_default<F: Float, const N: usize>(
    path: &Path,
) -> Result<Vec<StaticSphericalObstacle<F, N>>> {
    if !path.exists() {
        warn!("Obstacle file {} not found, planning without obstacles", path.display());
        return Ok(Vec::new());
    }
    read_obstacles(path)
}

/// Like [`read_vehicle`], but a missing file yields a point vehicle.
pub fn read_vehicle_or_default<F: Float, const N: usize>(path: &Path) -> Result<Vehicle<F, N>> {
    if !path.exists() {
        warn!("Vehicle file {} not found, using a point vehicle", path.display());
        return Ok(Vehicle::point());
    }
    read_vehicle(path)
}

/// Non-empty lines after the header, split on commas. Line numbers are 1-based.
fn records(path: &Path) -> Result<Vec<(usize, Vec<String>)>> {
    let contents = fs::read_to_string(path).map_err(|e| PlannerError::io(path, e))?;
    Ok(contents
        .lines()
        .enumerate()
        .skip(1)
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            (
                i + 1,
                line.split(',').map(|field| field.trim().to_string()).collect(),
            )
        })
        .collect())
}

fn parse_fields<F: Float>(
    path: &Path,
    line: usize,
    fields: &[String],
    min: usize,
    max: usize,
) -> Result<Vec<F>> {
    if fields.len() < min || fields.len() > max {
        let expected = if min == max {
            min.to_string()
        } else {
            format!("{} to {}", min, max)
        };
        return Err(PlannerError::parse(
            path,
            line,
            format!("expected {} fields, found {}", expected, fields.len()),
        ));
    }
    fields
        .iter()
        .map(|field| {
            field
                .parse::<f64>()
                .ok()
                .and_then(F::from)
                .ok_or_else(|| PlannerError::parse(path, line, format!("invalid number '{}'", field)))
        })
        .collect()
}

fn position_from<F: Float, const N: usize>(values: &[F]) -> RealVectorState<F, N> {
    let mut position = RealVectorState::zeros();
    for i in 0..N {
        position[i] = values[i];
    }
    position
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacles::SphericalObstacle;
    use approx::assert_relative_eq;
    use std::io::Write;

    fn file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_states_with_and_without_radius() {
        let plain = file("x,y,theta\n0,0,0\n90,90,1.5\n");
        let (start, goal) = read_states::<f64, 2>(plain.path(), 5.0).unwrap();
        assert_eq!(start.position, RealVectorState::new([0.0, 0.0]));
        assert_relative_eq!(goal.pose.heading, 1.5);
        assert_relative_eq!(goal.radius, 5.0);

        let with_radius = file("x,y,theta\n0,0,0\n90,90,1.5,2.5\n");
        let (_, goal) = read_states::<f64, 2>(with_radius.path(), 5.0).unwrap();
        assert_relative_eq!(goal.radius, 2.5);
    }

    #[test]
    fn states_need_both_records() {
        let short = file("x,y,theta\n0,0,0\n");
        assert!(matches!(
            read_states::<f64, 2>(short.path(), 5.0),
            Err(PlannerError::MissingRecord { what: "goal", .. })
        ));
    }

    #[test]
    fn malformed_obstacle_reports_line() {
        let bad = file("x,y,r\n1,2,3\n4,oops,6\n");
        match read_obstacles::<f64, 2>(bad.path()) {
            Err(PlannerError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected a parse error, got {:?}", other.map(|o| o.len())),
        }
        let short = file("x,y,r\n1,2\n");
        assert!(read_obstacles::<f64, 2>(short.path()).is_err());
    }

    #[test]
    fn reads_three_dimensional_obstacles() {
        let obstacles = file("x,y,z,r\n1,2,3,4\n\n5,6,7,8\n");
        let obstacles = read_obstacles::<f64, 3>(obstacles.path()).unwrap();
        assert_eq!(obstacles.len(), 2);
        assert_eq!(obstacles[1].center(), &RealVectorState::new([5.0, 6.0, 7.0]));
        assert_relative_eq!(obstacles[1].radius(), 8.0);
    }

    #[test]
    fn missing_optional_files_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let obstacles =
            read_obstacles_or_default::<f64, 2>(&dir.path().join("obstacles.txt")).unwrap();
        assert!(obstacles.is_empty());
        let vehicle = read_vehicle_or_default::<f64, 2>(&dir.path().join("robot.txt")).unwrap();
        assert!(vehicle.is_point());
        assert!(read_vehicle::<f64, 2>(&dir.path().join("robot.txt")).is_err());
    }
}
