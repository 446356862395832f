/// Separable Gaussian blur over a straight RGBA8 buffer.
///
/// Sampling clamps to the image edge, so constant images are unchanged and
/// no energy leaks at the borders. A zero radius returns the input as-is.
pub(crate) fn gaussian_blur_rgba8(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> Vec<u8> {
    let expected = width as usize * height as usize * 4;
    debug_assert_eq!(src.len(), expected, "blur buffer must be width*height*4");
    if radius == 0 || width == 0 || height == 0 || src.len() != expected {
        return src.to_vec();
    }

    let kernel = gaussian_kernel(radius, sigma);
    let tmp = convolve_axis(src, width, height, &kernel, Axis::X);
    convolve_axis(&tmp, width, height, &kernel, Axis::Y)
}

enum Axis {
    X,
    Y,
}

fn gaussian_kernel(radius: u32, sigma: f32) -> Vec<f32> {
    let sigma = if sigma.is_finite() && sigma > 0.0 {
        f64::from(sigma)
    } else {
        f64::from(radius) / 2.0
    };
    let r = radius as i64;
    let denom = 2.0 * sigma * sigma;

    let mut weights: Vec<f64> = (-r..=r)
        .map(|i| (-(i as f64) * (i as f64) / denom).exp())
        .collect();
    let sum: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }
    weights.into_iter().map(|w| w as f32).collect()
}

fn convolve_axis(src: &[u8], width: u32, height: u32, kernel: &[f32], axis: Axis) -> Vec<u8> {
    let w = width as i64;
    let h = height as i64;
    let radius = (kernel.len() / 2) as i64;
    let mut dst = vec![0u8; src.len()];

    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 4];
            for (ki, &kw) in kernel.iter().enumerate() {
                let offset = ki as i64 - radius;
                let (sx, sy) = match axis {
                    Axis::X => ((x + offset).clamp(0, w - 1), y),
                    Axis::Y => (x, (y + offset).clamp(0, h - 1)),
                };
                let idx = ((sy * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += kw * f32::from(src[idx + c]);
                }
            }
            let out = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out + c] = acc[c].round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    dst
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
