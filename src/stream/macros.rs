macro_rules! adaptor {
    ($(#[$attr:meta])* $name:ident<$inner:ident>($session:ident, $config:ident)) => {
        pin_project_lite::pin_project! {
            $(#[$attr])*
            #[derive(Debug)]
            pub struct $name<$inner> {
                #[pin]
                inner: crate::stream::Transform<$inner, $session>,
            }
        }

        impl<$inner: futures_core::stream::Stream<Item = std::io::Result<bytes::Bytes>>> $name<$inner> {
            /// Creates a new adaptor over `stream` using the default settings.
            pub fn new(stream: $inner, format: crate::Format) -> Self {
                Self::with_config(stream, format, $config::default())
            }

            /// Creates a new adaptor over `stream` using `config`.
            pub fn with_config(stream: $inner, format: crate::Format, config: $config) -> Self {
                Self::with_session(stream, $session::new(format, config))
            }

            /// Creates a new adaptor over `stream` for the format called `name`.
            ///
            /// Fails with [`Error::UnsupportedFormat`](crate::Error::UnsupportedFormat) for an
            /// unknown name.
            pub fn from_name(stream: $inner, name: &str, config: $config) -> crate::Result<Self> {
                Ok(Self::with_config(stream, name.parse()?, config))
            }

            /// Creates a new adaptor driving an existing session.
            pub fn with_session(stream: $inner, session: $session) -> Self {
                Self {
                    inner: crate::stream::Transform::new(stream, session),
                }
            }

            /// Running CRC-32 of the session, see
            /// [`Session::checksum`](crate::session::Session::checksum).
            pub fn checksum(&self) -> Option<u32> {
                crate::session::Session::checksum(self.inner.session())
            }

            /// Acquires a reference to the underlying stream that this adaptor is wrapping.
            pub fn get_ref(&self) -> &$inner {
                self.inner.get_ref()
            }

            /// Acquires a mutable reference to the underlying stream that this adaptor is
            /// wrapping.
            ///
            /// Note that care must be taken to avoid tampering with the state of the stream
            /// which may otherwise confuse this adaptor.
            pub fn get_mut(&mut self) -> &mut $inner {
                self.inner.get_mut()
            }

            /// Acquires a pinned mutable reference to the underlying stream that this adaptor is
            /// wrapping.
            ///
            /// Note that care must be taken to avoid tampering with the state of the stream
            /// which may otherwise confuse this adaptor.
            pub fn get_pin_mut(self: std::pin::Pin<&mut Self>) -> std::pin::Pin<&mut $inner> {
                self.project().inner.get_pin_mut()
            }

            /// Consumes this adaptor returning the underlying stream.
            ///
            /// The session is released; output it had not produced yet is lost.
            pub fn into_inner(self) -> $inner {
                self.inner.into_inner()
            }
        }

        impl<$inner: futures_core::stream::Stream<Item = std::io::Result<bytes::Bytes>>>
            futures_core::stream::Stream for $name<$inner>
        {
            type Item = std::io::Result<bytes::Bytes>;

            fn poll_next(
                self: std::pin::Pin<&mut Self>,
                cx: &mut std::task::Context<'_>,
            ) -> std::task::Poll<Option<std::io::Result<bytes::Bytes>>> {
                futures_core::stream::Stream::poll_next(self.project().inner, cx)
            }
        }

        const _: () = {
            fn _assert() {
                use crate::util::{_assert_send, _assert_sync};
                use bytes::Bytes;
                use core::pin::Pin;
                use futures_core::stream::Stream;
                use std::io::Result;

                _assert_send::<$name<Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>>>();
                _assert_sync::<$name<Pin<Box<dyn Stream<Item = Result<Bytes>> + Sync>>>>();
            }
        };
    };
}
