use ndarray::Array2;

use crate::errors::Result;

/// Write a genotype matrix as a NumPy array of shape `(sites, samples)`.
pub fn write_genotypes(genotypes: &Array2<f64>, writer: &mut impl std::io::Write) -> Result<()> {
    let shape: Vec<u64> = genotypes.shape().iter().map(|&n| n as u64).collect();
    let mut npy_writer = npyz::WriteOptions::new()
        .default_dtype()
        .shape(&shape)
        .writer(writer)
        .begin_nd()?;
    npy_writer.extend(genotypes.iter().copied())?;
    npy_writer.finish()?;
    Ok(())
}

pub fn write_genotypes_to_file(genotypes: &Array2<f64>, path: &str) -> Result<()> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_genotypes(genotypes, &mut file)?;
    log::info!("Wrote genotype matrix of shape {:?} to {}", genotypes.shape(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn write_matrix() {
        let genotypes = array![[0., 1., 1.], [1., 0., 2.]];
        let mut buffer = Vec::new();

        write_genotypes(&genotypes, &mut buffer).unwrap();

        let npy_data = npyz::NpyFile::new(buffer.as_slice()).unwrap();
        assert_eq!(npy_data.shape(), &[2, 3]);
        let data: Vec<f64> = npy_data
            .data::<f64>()
            .unwrap()
            .map(|el| el.unwrap())
            .collect();
        assert_eq!(data, vec![0., 1., 1., 1., 0., 2.]);
    }
}
