// Monotone-in-x cubic interpolation (Fritsch-Carlson tangents) for band
// outlines. Produces path commands the renderer serializes verbatim.

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo((f32, f32)),
    LineTo((f32, f32)),
    /// Cubic Bezier: two control points, then the destination.
    CurveTo((f32, f32), (f32, f32), (f32, f32)),
    Close,
}

/// Commands tracing a smooth curve through `points`, starting with a
/// `MoveTo`. The interpolant passes through every input point and never
/// overshoots a monotone run in y.
pub fn monotone_x(points: &[(f32, f32)]) -> Vec<PathCommand> {
    let mut commands = Vec::with_capacity(points.len() + 1);
    let Some(first) = points.first() else {
        return commands;
    };
    commands.push(PathCommand::MoveTo(*first));
    extend_monotone_x(&mut commands, points);
    commands
}

/// Same as [`monotone_x`] but continues an open path: a straight joint to
/// the first point, then the curve. Used for the return edge of a band.
pub fn join_monotone_x(commands: &mut Vec<PathCommand>, points: &[(f32, f32)]) {
    let Some(first) = points.first() else {
        return;
    };
    commands.push(PathCommand::LineTo(*first));
    extend_monotone_x(commands, points);
}

fn extend_monotone_x(commands: &mut Vec<PathCommand>, points: &[(f32, f32)]) {
    let n = points.len();
    if n < 2 {
        return;
    }
    if n == 2 {
        commands.push(PathCommand::LineTo(points[1]));
        return;
    }

    let mut tangents = vec![0.0_f32; n];
    for j in 1..n - 1 {
        tangents[j] = interior_tangent(points[j - 1], points[j], points[j + 1]);
    }
    tangents[0] = endpoint_tangent(points[0], points[1], tangents[1]);
    tangents[n - 1] = endpoint_tangent(points[n - 2], points[n - 1], tangents[n - 2]);

    for i in 1..n {
        commands.push(bezier(points[i - 1], points[i], tangents[i - 1], tangents[i]));
    }
}

// Fritsch-Carlson: harmonic-style mean of the adjacent secant slopes,
// zeroed whenever the secants disagree in sign so runs stay monotone.
fn interior_tangent(p0: (f32, f32), p1: (f32, f32), p2: (f32, f32)) -> f32 {
    let h0 = p1.0 - p0.0;
    let h1 = p2.0 - p1.0;
    let s0 = secant(p0, p1, h0, h1);
    let s1 = secant(p1, p2, h1, h0);
    let p = (s0 * h1 + s1 * h0) / (h0 + h1);
    let bound = s0.abs().min(s1.abs()).min(0.5 * p.abs());
    let t = (sign(s0) + sign(s1)) * bound;
    if t.is_finite() {
        t
    } else {
        0.0
    }
}

fn secant(a: (f32, f32), b: (f32, f32), h: f32, other_h: f32) -> f32 {
    let dy = b.1 - a.1;
    if h != 0.0 {
        dy / h
    } else if other_h != 0.0 {
        dy / other_h
    } else {
        0.0
    }
}

// One-sided tangent preserving the shape of the first/last segment given
// the neighboring tangent.
fn endpoint_tangent(a: (f32, f32), b: (f32, f32), neighbor: f32) -> f32 {
    let h = b.0 - a.0;
    if h != 0.0 {
        (3.0 * (b.1 - a.1) / h - neighbor) / 2.0
    } else {
        neighbor
    }
}

fn sign(x: f32) -> f32 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

fn bezier(from: (f32, f32), to: (f32, f32), t0: f32, t1: f32) -> PathCommand {
    let dx = (to.0 - from.0) / 3.0;
    PathCommand::CurveTo(
        (from.0 + dx, from.1 + dx * t0),
        (to.0 - dx, to.1 - dx * t1),
        to,
    )
}
