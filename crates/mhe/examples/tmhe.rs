// Threshold multiparty BFV: secrets are Shamir-shared so that any `threshold`
// out of `num_parties` participants can key and decrypt.

mod util;

use std::{env, error::Error, process::exit};

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use mhe::{
    bfv::{Ciphertext, Computer, Encoding},
    mbfv::{Aggregate, CommonReferenceString, DecryptionShare, KeyGenRound, PublicKeyShare},
    participant::Participant,
    trbfv::{Combiner, QuorumDescriptor, ThresholdConfig, Thresholdizer},
};
use mhe_traits::FheDecoder;
use rand::thread_rng;
use rayon::prelude::*;
use tracing::info;
use util::timeit::timeit;

fn print_notice_and_exit(error: Option<String>) {
    println!(
        "{} Threshold multiparty BFV",
        style("  overview:").magenta().bold()
    );
    println!(
        "{} tmhe [-h] [--help] [--num_parties=<value>] [--threshold=<value>] [--online=<value>]",
        style("     usage:").magenta().bold()
    );
    println!(
        "{} {} must be at least 3, {} between 1 and {}, and {} between {} and {}",
        style("constraints:").magenta().bold(),
        style("num_parties").blue(),
        style("threshold").blue(),
        style("num_parties").blue(),
        style("online").blue(),
        style("threshold").blue(),
        style("num_parties").blue(),
    );
    if let Some(error) = error {
        println!("{} {}", style("     error:").red().bold(), error);
    }
    exit(0);
}

fn check_arguments(num_parties: usize, threshold: usize, online: usize) -> Result<(), String> {
    if num_parties < 3 {
        return Err("At least 3 parties are required".to_string());
    }
    if threshold == 0 || threshold > num_parties {
        return Err("The threshold must be between 1 and the number of parties".to_string());
    }
    if online == 0 || online > num_parties {
        return Err(
            "The number of online parties must be between 1 and the number of parties"
                .to_string(),
        );
    }
    if online < threshold {
        return Err(format!("At least {threshold} parties must be online to decrypt"));
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    util::init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.contains(&"-h".to_string()) || args.contains(&"--help".to_string()) {
        print_notice_and_exit(None)
    }

    let mut num_parties = 100;
    let mut threshold = 95;
    let mut online = None;
    for arg in &args {
        let parsed = util::parse_flag(arg, "--num_parties")
            .map(|v| v.map(|n| num_parties = n))
            .or_else(|| util::parse_flag(arg, "--threshold").map(|v| v.map(|t| threshold = t)))
            .or_else(|| util::parse_flag(arg, "--online").map(|v| v.map(|o| online = Some(o))));
        match parsed {
            Some(Ok(())) => {}
            Some(Err(e)) => print_notice_and_exit(Some(e)),
            None => print_notice_and_exit(Some(format!("Unrecognized argument: {arg}"))),
        }
    }
    let online = online.unwrap_or(threshold);
    if let Err(e) = check_arguments(num_parties, threshold, online) {
        print_notice_and_exit(Some(e))
    }

    println!("# Threshold multiparty BFV");
    println!("\tnum_parties = {num_parties}");
    println!("\tthreshold = {threshold}");
    println!("\tonline = {online}");

    let params = timeit!("Parameters generation", util::demo_parameters()?);
    let config = ThresholdConfig::new(num_parties, threshold, &params)?;
    let thresholdizer = Thresholdizer::new(&params, config);
    let combiner = Combiner::new(&params, config);

    let mut parties = timeit!(
        "Secret key generation",
        (0..num_parties)
            .into_par_iter()
            .map(|i| Participant::new(i, &params, &mut thread_rng()))
            .collect::<Result<Vec<_>, _>>()?
    );

    timeit!("Secret sharing", {
        let dealt = parties
            .par_iter_mut()
            .map(|p| p.deal(&thresholdizer, &mut thread_rng()))
            .collect::<Result<Vec<_>, _>>()?;

        let progress = ProgressBar::new(num_parties as u64).with_style(
            ProgressStyle::with_template("{prefix} {bar:40.cyan/blue} {pos}/{len}")?,
        );
        progress.set_prefix("aggregating shares");
        parties
            .par_iter_mut()
            .map(|p| {
                let index = p.index();
                for share in dealt.iter().filter_map(|shares| shares.get(index)) {
                    p.receive(&thresholdizer, share)?;
                }
                progress.inc(1);
                Ok(())
            })
            .collect::<Result<Vec<_>, mhe::Error>>()?;
        progress.finish_and_clear();
    });

    // The first `online` participants form the quorum, for key generation
    // and for every decryption.
    let quorum_members = (0..online).collect::<Vec<_>>();
    let quorum = QuorumDescriptor::from_participants(threshold, &quorum_members)?;

    let additive = timeit!(
        "Reconstruction",
        quorum_members
            .par_iter()
            .map(|i| parties[*i].additive_share(&combiner, &quorum))
            .collect::<Result<Vec<_>, _>>()?
    );

    let pk = timeit!("Public key generation", {
        let crs = CommonReferenceString::new(&mut thread_rng());
        let round = KeyGenRound::new(&params, crs.sample_crp(&params))?;
        let shares = quorum_members
            .par_iter()
            .zip(additive.par_iter())
            .map(|(i, share)| {
                parties[*i].threshold_public_key_share(share, &round, &mut thread_rng())
            })
            .collect::<Result<Vec<_>, _>>()?;
        round.finalize(&PublicKeyShare::from_shares(shares)?, &quorum_members)?
    });

    let cts = timeit!(
        "Encryption",
        parties
            .par_iter()
            .map(|p| {
                let input = vec![p.index() as u64; params.degree()];
                p.encrypt(&input, &pk, &mut thread_rng())
            })
            .collect::<Result<Vec<_>, _>>()?
    );

    let ct_add = timeit!("Computation", {
        let mut ct_add = cts[0].clone();
        Computer::new(&params).add(&cts[1], &cts[2], &mut ct_add)?;
        ct_add
    });

    let decrypt = |ct: &Ciphertext| -> Result<Vec<u64>, Box<dyn Error>> {
        let shares = quorum_members
            .par_iter()
            .zip(additive.par_iter())
            .map(|(i, share)| parties[*i].threshold_decryption_share(share, ct, &mut thread_rng()))
            .collect::<Result<Vec<_>, _>>()?;
        let pt =
            DecryptionShare::from_shares(shares)?.finalize(ct, &quorum_members, quorum_members[0])?;
        Ok(Vec::<u64>::try_decode(&pt, Encoding::simd())?)
    };

    timeit!("Decryption", {
        for (j, ct) in cts.iter().enumerate() {
            util::print_slots(&format!("party {j}"), &decrypt(ct)?);
        }
        let sum = decrypt(&ct_add)?;
        util::print_slots("ct_add", &sum);
        info!(expected = 3, got = sum[0], "decrypted the sum of parties 1 and 2");
    });

    Ok(())
}
