use conway_pool::{
    patterns::PATTERNS, Dense, Encoding, NiceInt, Packed, PoolConfig, Seed, WorkerPool,
};

const GENERATIONS: u64 = 1_000;

fn run<E: Encoding>(config: &PoolConfig) -> anyhow::Result<()> {
    let timer = std::time::Instant::now();
    let mut pool = WorkerPool::<E>::new(config)?;
    println!(
        "[{}, {} workers] time on building pool: {:?}",
        E::NAME,
        config.workers,
        timer.elapsed()
    );

    let timer = std::time::Instant::now();
    pool.advance(GENERATIONS);
    let elapsed = timer.elapsed();
    let updates = GENERATIONS as f64 * (config.rows * config.cols) as f64;
    println!(
        "[{}, {} workers] {} generations in {:?}, {} cell updates/s, population {}",
        E::NAME,
        config.workers,
        GENERATIONS,
        elapsed,
        NiceInt::from_f64(updates / elapsed.as_secs_f64()),
        NiceInt::from_usize(pool.grid().population()),
    );
    pool.shutdown();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let base = PoolConfig {
        seed: Seed::Random {
            seed: Some(42),
            fill_rate: 0.3,
        },
        ..PoolConfig::from_env()
    };
    let max_workers = std::thread::available_parallelism()?.get();

    let mut workers = 1;
    while workers <= max_workers.max(base.workers) {
        let config = PoolConfig { workers, ..base };
        if config.validate::<Packed>().is_ok() {
            run::<Dense>(&config)?;
            run::<Packed>(&config)?;
        } else if config.validate::<Dense>().is_ok() {
            run::<Dense>(&config)?;
        } else {
            println!("skipping {} workers: {} rows do not split evenly", workers, config.rows);
        }
        workers *= 2;
    }

    let (rows, cols) = (base.rows, base.cols);
    for &pattern in PATTERNS {
        let config = PoolConfig {
            seed: Seed::Pattern {
                pattern,
                row: rows.saturating_sub(pattern.height()) / 2,
                col: cols.saturating_sub(pattern.width()) / 2,
            },
            ..base
        };
        if config.validate::<Dense>().is_err() {
            continue;
        }
        let timer = std::time::Instant::now();
        let mut pool = WorkerPool::<Dense>::new(&config)?;
        pool.advance(GENERATIONS);
        println!(
            "[{}] population {} after {} generations in {:?}",
            pattern.name,
            NiceInt::from_usize(pool.grid().population()),
            GENERATIONS,
            timer.elapsed()
        );
    }
    Ok(())
}
