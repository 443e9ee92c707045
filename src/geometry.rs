/*

    Standalone geometry utilities: axis aligned boxes, a symmetric
    3x3 eigen solver and the PCA based oriented bounding box fit used
    when merging multi-part models.

    @date: 14 Nov, 2025
    @author: bartu
*/

use crate::prelude::*;

/// Axis aligned bounding box, inclusive min/max corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector3,
    pub max: Vector3,
}

impl Aabb {
    pub fn new(min: Vector3, max: Vector3) -> Self {
        debug_assert!(min.x <= max.x && min.y <= max.y && min.z <= max.z);
        Self { min, max }
    }

    /// Smallest box containing all the given points.
    /// Returns None for an empty point set.
    pub fn from_points(points: impl IntoIterator<Item = Vector3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut aabb = Self {
            min: first,
            max: first,
        };
        for p in iter {
            aabb.min = aabb.min.min(p);
            aabb.max = aabb.max.max(p);
        }
        Some(aabb)
    }

    pub fn center(&self) -> Vector3 {
        (self.min + self.max) / 2.0
    }

    pub fn size(&self) -> Vector3 {
        self.max - self.min
    }

    pub fn corners(&self) -> [Vector3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vector3::new(lo.x, lo.y, lo.z),
            Vector3::new(hi.x, lo.y, lo.z),
            Vector3::new(lo.x, hi.y, lo.z),
            Vector3::new(hi.x, hi.y, lo.z),
            Vector3::new(lo.x, lo.y, hi.z),
            Vector3::new(hi.x, lo.y, hi.z),
            Vector3::new(lo.x, hi.y, hi.z),
            Vector3::new(hi.x, hi.y, hi.z),
        ]
    }
}

/// Box with an orientation, produced by the PCA fit.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientedBox {
    pub center: Vector3,
    pub orientation: Quaternion,
    pub size: Vector3,
}

impl Default for OrientedBox {
    fn default() -> Self {
        Self {
            center: Vector3::ZERO,
            orientation: Quaternion::IDENTITY,
            size: Vector3::ZERO,
        }
    }
}

// One Jacobi rotation zeroing the (p, q) element, accumulating the
// rotation into v. Textbook formulation, see Numerical Recipes ch. 11
// or https://en.wikipedia.org/wiki/Jacobi_eigenvalue_algorithm
fn jacobi_rotate(a: &mut [[Float; 3]; 3], v: &mut [[Float; 3]; 3], p: usize, q: usize) {
    let apq = a[p][q];
    if apq == 0.0 {
        return;
    }

    let theta = (a[q][q] - a[p][p]) / (2.0 * apq);
    let t = if theta >= 0.0 {
        1.0 / (theta + (1.0 + theta * theta).sqrt())
    } else {
        -1.0 / (-theta + (1.0 + theta * theta).sqrt())
    };
    let c = 1.0 / (1.0 + t * t).sqrt();
    let s = t * c;
    let tau = s / (1.0 + c);

    let app = a[p][p];
    let aqq = a[q][q];
    a[p][p] = app - t * apq;
    a[q][q] = aqq + t * apq;
    a[p][q] = 0.0;
    a[q][p] = 0.0;

    for k in 0..3 {
        if k != p && k != q {
            let akp = a[k][p];
            let akq = a[k][q];
            a[k][p] = akp - s * (akq + tau * akp);
            a[p][k] = a[k][p];
            a[k][q] = akq + s * (akp - tau * akq);
            a[q][k] = a[k][q];
        }
    }
    for row in v.iter_mut() {
        let vp = row[p];
        let vq = row[q];
        row[p] = vp - s * (vq + tau * vp);
        row[q] = vq + s * (vp - tau * vq);
    }
}

/// Eigen decomposition of a symmetric 3x3 matrix by cyclic Jacobi
/// rotations. Returns eigenvalues in ascending order and the matching
/// eigenvectors as the columns of a right-handed rotation matrix.
pub fn symmetric_eigen(mat: &Matrix3) -> (Vector3, Matrix3) {
    // Row-indexed copy; the input must be symmetric so the storage
    // order of Matrix3 doesn't matter here.
    let cols = mat.to_cols_array_2d();
    let mut a = [
        [cols[0][0], cols[1][0], cols[2][0]],
        [cols[0][1], cols[1][1], cols[2][1]],
        [cols[0][2], cols[1][2], cols[2][2]],
    ];
    let mut v = [[0.0; 3]; 3];
    v[0][0] = 1.0;
    v[1][1] = 1.0;
    v[2][2] = 1.0;

    for _ in 0..50 {
        // Pick the largest off-diagonal element
        let (mut p, mut q) = (0, 1);
        if a[0][2].abs() > a[p][q].abs() {
            (p, q) = (0, 2);
        }
        if a[1][2].abs() > a[p][q].abs() {
            (p, q) = (1, 2);
        }
        if a[p][q].abs() < 1e-12 {
            break;
        }
        jacobi_rotate(&mut a, &mut v, p, q);
    }

    // Sort eigenpairs ascending, the order Eigen's self adjoint solver
    // uses (the merge code downstream relies on determinism only)
    let mut order = [0usize, 1, 2];
    order.sort_by(|&i, &j| a[i][i].partial_cmp(&a[j][j]).unwrap_or(std::cmp::Ordering::Equal));

    let eigenvalues = Vector3::new(a[order[0]][order[0]], a[order[1]][order[1]], a[order[2]][order[2]]);
    let mut basis = Matrix3::from_cols(
        Vector3::new(v[0][order[0]], v[1][order[0]], v[2][order[0]]),
        Vector3::new(v[0][order[1]], v[1][order[1]], v[2][order[1]]),
        Vector3::new(v[0][order[2]], v[1][order[2]], v[2][order[2]]),
    );

    // Keep the basis right-handed so it converts to a unit quaternion
    if basis.determinant() < 0.0 {
        basis.z_axis = -basis.z_axis;
    }

    (eigenvalues, basis)
}

/// Best-fit oriented bounding box of a point cloud via principal
/// component analysis: covariance eigenvectors give the box axes, the
/// extents are the min/max of the points projected onto that basis.
pub fn fit_oriented_box(points: &[Vector3]) -> OrientedBox {
    if points.is_empty() {
        warn!("Fitting an oriented box to an empty point cloud");
        return OrientedBox::default();
    }

    let n = points.len() as Float;
    let centroid = points.iter().copied().sum::<Vector3>() / n;

    // Covariance of the cloud
    let (mut xx, mut xy, mut xz, mut yy, mut yz, mut zz) = (0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
    for p in points {
        let r = *p - centroid;
        xx += r.x * r.x;
        xy += r.x * r.y;
        xz += r.x * r.z;
        yy += r.y * r.y;
        yz += r.y * r.z;
        zz += r.z * r.z;
    }
    let covariance = Matrix3::from_cols(
        Vector3::new(xx, xy, xz),
        Vector3::new(xy, yy, yz),
        Vector3::new(xz, yz, zz),
    ) * (1.0 / n);

    let (_, basis) = symmetric_eigen(&covariance);

    // Extents of the cloud expressed in the eigenbasis
    let to_local = basis.transpose();
    let mut lo = Vector3::MAX;
    let mut hi = Vector3::MIN;
    for p in points {
        let q = to_local * (*p - centroid);
        lo = lo.min(q);
        hi = hi.max(q);
    }

    OrientedBox {
        center: centroid + basis * ((lo + hi) / 2.0),
        orientation: Quaternion::from_mat3(&basis),
        size: hi - lo,
    }
}
