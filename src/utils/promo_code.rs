use rand::Rng;

pub const PROMO_CODE_PREFIX: &str = "BONUS";
const PROMO_CODE_SUFFIX_LEN: usize = 6;
const PROMO_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// 生成兑换码：BONUS + 6 位大写字母/数字；唯一性由调用方检查
pub fn generate_promo_code() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..PROMO_CODE_SUFFIX_LEN)
        .map(|_| PROMO_CODE_CHARSET[rng.gen_range(0..PROMO_CODE_CHARSET.len())] as char)
        .collect();
    format!("{PROMO_CODE_PREFIX}{suffix}")
}
