/// Scales `vector` to unit L2 length. Vectors with no direction (all zeros) or
/// a non-finite norm are left untouched.
pub(crate) fn normalize_l2(vector: &mut [f32]) {
    let norm = vector.iter().fold(0.0f32, |acc, x| acc + x * x).sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return;
    }
    vector.iter_mut().for_each(|x| *x /= norm);
}
